pub mod forms;
pub mod job_filter;
pub mod map_control;
pub mod media;
pub mod messaging;
pub mod notifications;
pub mod page;
pub mod rating;
pub mod template;

pub use crate::domain::document::{Document, ElementSpec, NodeId};
pub use crate::domain::model::{JobFilter, LatLng, Severity};
pub use crate::domain::ports::{MapSurface, MarketplaceApi};
pub use crate::utils::error::Result;
