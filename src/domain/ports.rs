use crate::domain::model::{
    ApiAck, AvailabilityRequest, CircleStyle, LatLng, MessageRequest, TileLayer,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Identifier of a layer (tiles, marker, circle) placed on a map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// A rendered map widget. One value is one map instance.
pub trait MapSurface: Send {
    fn set_view(&mut self, center: LatLng, zoom: u8);
    fn add_tile_layer(&mut self, layer: &TileLayer) -> LayerId;
    fn add_marker(&mut self, at: LatLng, popup: Option<&str>) -> LayerId;
    fn add_circle(&mut self, center: LatLng, radius_m: f64, style: &CircleStyle) -> LayerId;
    /// Returns false if the layer was not attached.
    fn remove_layer(&mut self, id: LayerId) -> bool;
    fn has_layer(&self, id: LayerId) -> bool;
}

/// Backend endpoints the page talks to.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    async fn post_message(&self, request: &MessageRequest) -> Result<ApiAck>;
    async fn post_availability(&self, request: &AvailabilityRequest) -> Result<ApiAck>;
}
