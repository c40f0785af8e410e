use crate::domain::model::{CircleStyle, LatLng, TileLayer};
use crate::domain::ports::{LayerId, MapSurface};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Tiles(TileLayer),
    Marker {
        at: LatLng,
        popup: Option<String>,
    },
    Circle {
        center: LatLng,
        radius_m: f64,
        style: CircleStyle,
    },
}

/// Headless map surface that records the layers placed on it.
#[derive(Debug, Default)]
pub struct InMemoryMap {
    view: Option<(LatLng, u8)>,
    layers: BTreeMap<LayerId, Layer>,
    next_id: u64,
}

impl InMemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> Option<(LatLng, u8)> {
        self.view
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn layers(&self) -> impl Iterator<Item = (&LayerId, &Layer)> {
        self.layers.iter()
    }

    pub fn marker_count(&self) -> usize {
        self.layers
            .values()
            .filter(|l| matches!(l, Layer::Marker { .. }))
            .count()
    }

    pub fn circle_count(&self) -> usize {
        self.layers
            .values()
            .filter(|l| matches!(l, Layer::Circle { .. }))
            .count()
    }

    fn insert(&mut self, layer: Layer) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(id, layer);
        id
    }
}

impl MapSurface for InMemoryMap {
    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.view = Some((center, zoom));
    }

    fn add_tile_layer(&mut self, layer: &TileLayer) -> LayerId {
        self.insert(Layer::Tiles(layer.clone()))
    }

    fn add_marker(&mut self, at: LatLng, popup: Option<&str>) -> LayerId {
        self.insert(Layer::Marker {
            at,
            popup: popup.map(str::to_string),
        })
    }

    fn add_circle(&mut self, center: LatLng, radius_m: f64, style: &CircleStyle) -> LayerId {
        self.insert(Layer::Circle {
            center,
            radius_m,
            style: style.clone(),
        })
    }

    fn remove_layer(&mut self, id: LayerId) -> bool {
        self.layers.remove(&id).is_some()
    }

    fn has_layer(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_ids_are_not_reused() {
        let mut map = InMemoryMap::new();
        let first = map.add_marker(LatLng::new(1.0, 2.0), None);
        assert!(map.remove_layer(first));
        let second = map.add_marker(LatLng::new(1.0, 2.0), Some("again"));

        assert_ne!(first, second);
        assert!(!map.has_layer(first));
        assert!(!map.remove_layer(first));
        assert_eq!(map.marker_count(), 1);
    }
}
