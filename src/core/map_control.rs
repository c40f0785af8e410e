use crate::domain::model::{CircleStyle, LatLng, TileLayer};
use crate::domain::ports::{LayerId, MapSurface};
use crate::utils::error::{PageError, Result};

/// A marker placed through the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerHandle {
    pub layer: LayerId,
    pub position: LatLng,
}

/// Owns the page's single map instance and the markers placed on it.
///
/// Every handle in `markers` is attached to the current surface. Service-area
/// circles are tracked apart from markers and survive `clear_markers`.
pub struct MapController<M: MapSurface> {
    surface: Option<M>,
    markers: Vec<MarkerHandle>,
    service_areas: Vec<LayerId>,
    tiles: TileLayer,
    circle_style: CircleStyle,
}

impl<M: MapSurface> MapController<M> {
    pub fn new(tiles: TileLayer) -> Self {
        Self {
            surface: None,
            markers: Vec::new(),
            service_areas: Vec::new(),
            tiles,
            circle_style: CircleStyle::default(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&M> {
        self.surface.as_ref()
    }

    pub fn markers(&self) -> &[MarkerHandle] {
        &self.markers
    }

    pub fn service_areas(&self) -> &[LayerId] {
        &self.service_areas
    }

    /// Installs `surface` as the page's map, centered at `center`, with the
    /// configured tile layer. A previous instance is torn down first.
    pub fn init_with(&mut self, mut surface: M, center: LatLng, zoom: u8) {
        if self.surface.is_some() {
            tracing::warn!("Map initialized twice, discarding the previous instance");
            self.clear_markers();
            self.clear_service_areas();
        }

        surface.set_view(center, zoom);
        surface.add_tile_layer(&self.tiles);
        tracing::debug!(
            "Map initialized at ({}, {}) zoom {}",
            center.lat,
            center.lng,
            zoom
        );
        self.surface = Some(surface);
    }

    fn surface_mut(&mut self) -> Result<&mut M> {
        self.surface.as_mut().ok_or(PageError::MapNotInitialized)
    }

    /// Coordinates are passed through unchecked.
    pub fn add_marker(&mut self, lat: f64, lng: f64, popup: Option<&str>) -> Result<MarkerHandle> {
        let position = LatLng::new(lat, lng);
        let layer = self.surface_mut()?.add_marker(position, popup);
        let handle = MarkerHandle { layer, position };
        self.markers.push(handle);
        Ok(handle)
    }

    /// Detaches every owned marker and returns how many were removed.
    pub fn clear_markers(&mut self) -> usize {
        let markers = std::mem::take(&mut self.markers);
        if let Some(surface) = self.surface.as_mut() {
            for marker in &markers {
                surface.remove_layer(marker.layer);
            }
        }
        markers.len()
    }

    pub fn draw_service_area(&mut self, center: LatLng, radius_km: f64) -> Result<LayerId> {
        let style = self.circle_style.clone();
        let layer = self
            .surface_mut()?
            .add_circle(center, radius_km * 1000.0, &style);
        self.service_areas.push(layer);
        Ok(layer)
    }

    pub fn clear_service_areas(&mut self) -> usize {
        let areas = std::mem::take(&mut self.service_areas);
        if let Some(surface) = self.surface.as_mut() {
            for layer in &areas {
                surface.remove_layer(*layer);
            }
        }
        areas.len()
    }
}

impl<M: MapSurface + Default> MapController<M> {
    pub fn init_map(&mut self, center: LatLng, zoom: u8) {
        self.init_with(M::default(), center, zoom);
    }
}
