pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::{http::HttpMarketplaceApi, map::InMemoryMap};
pub use config::PageConfig;
pub use core::page::{EventOutcome, Page, PageEvent};
pub use core::template::PageTemplate;
pub use utils::error::{PageError, Result};
