//! In-memory [`MapView`] with no rendering behind it.
//!
//! Follows the browser map's rules closely enough to catch ordering bugs:
//! ids are unique, layers need an existing source, and a source cannot be
//! removed while a layer still uses it.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::map::{CameraOptions, LayerSpec, MapView, SourceSpec};

#[derive(Debug, Clone, Default)]
pub struct HeadlessMap {
    loaded: bool,
    zoom: f64,
    camera: Option<CameraOptions>,
    sources: BTreeMap<String, SourceSpec>,
    layers: Vec<LayerSpec>,
    fail_mutations: bool,
}

impl HeadlessMap {
    pub fn new(zoom: f64) -> Self {
        HeadlessMap {
            zoom,
            ..Default::default()
        }
    }

    /// Install the base style layers and mark the map loaded.
    pub fn load(&mut self, base_layers: Vec<LayerSpec>) {
        self.layers = base_layers;
        self.loaded = true;
    }

    /// Make every add/remove fail, as a detached container would.
    pub fn set_fail_mutations(&mut self, fail: bool) {
        self.fail_mutations = fail;
    }

    pub fn camera(&self) -> Option<&CameraOptions> {
        self.camera.as_ref()
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn source_ids(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    /// Style document for the current state.
    pub fn to_style_json(&self) -> Value {
        json!({
            "version": 8,
            "sources": self.sources,
            "layers": self.layers,
        })
    }

    fn check_mutable(&self) -> Result<()> {
        if self.fail_mutations {
            return Err(Error::render("map container is detached"));
        }
        Ok(())
    }
}

impl MapView for HeadlessMap {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<()> {
        self.check_mutable()?;
        if self.sources.contains_key(id) {
            return Err(Error::render(format!("source {} already exists", id)));
        }
        self.sources.insert(id.to_string(), source);
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<()> {
        self.check_mutable()?;
        if let Some(layer) = self
            .layers
            .iter()
            .find(|l| l.source.as_deref() == Some(id))
        {
            return Err(Error::render(format!(
                "source {} is still used by layer {}",
                id, layer.id
            )));
        }
        self.sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::render(format!("no source {}", id)))
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    fn add_layer(&mut self, layer: LayerSpec, before: Option<&str>) -> Result<()> {
        self.check_mutable()?;
        if self.has_layer(&layer.id) {
            return Err(Error::render(format!("layer {} already exists", layer.id)));
        }
        if let Some(source) = &layer.source {
            if !self.sources.contains_key(source) {
                return Err(Error::render(format!(
                    "layer {} references missing source {}",
                    layer.id, source
                )));
            }
        }
        let at = before
            .and_then(|b| self.layers.iter().position(|l| l.id == b))
            .unwrap_or(self.layers.len());
        self.layers.insert(at, layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<()> {
        self.check_mutable()?;
        let at = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| Error::render(format!("no layer {}", id)))?;
        self.layers.remove(at);
        Ok(())
    }

    fn style_layers(&self) -> Vec<LayerSpec> {
        self.layers.clone()
    }

    fn ease_to(&mut self, camera: CameraOptions) -> Result<()> {
        // No animation here: jump straight to the end state.
        self.zoom = camera.zoom;
        self.camera = Some(camera);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::LayerKind;
    use std::time::Duration;

    use airmap_shared::models::Coordinate;

    fn geojson() -> SourceSpec {
        SourceSpec::Geojson {
            data: json!({"type": "FeatureCollection", "features": []}),
        }
    }

    fn circle(id: &str, source: &str) -> LayerSpec {
        let mut layer = LayerSpec::new(id, LayerKind::Circle);
        layer.source = Some(source.to_string());
        layer
    }

    #[test]
    fn test_new_map_is_not_loaded() {
        let map = HeadlessMap::new(2.0);
        assert!(!map.is_loaded());
        assert!((map.zoom() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let mut map = HeadlessMap::new(2.0);
        map.add_source("a", geojson()).unwrap();
        assert!(matches!(
            map.add_source("a", geojson()),
            Err(Error::Render { .. })
        ));
    }

    #[test]
    fn test_layer_requires_source() {
        let mut map = HeadlessMap::new(2.0);
        assert!(map.add_layer(circle("c", "missing"), None).is_err());
        map.add_source("missing", geojson()).unwrap();
        map.add_layer(circle("c", "missing"), None).unwrap();
        assert!(map.has_layer("c"));
    }

    #[test]
    fn test_source_in_use_cannot_be_removed() {
        let mut map = HeadlessMap::new(2.0);
        map.add_source("s", geojson()).unwrap();
        map.add_layer(circle("c", "s"), None).unwrap();
        assert!(map.remove_source("s").is_err());
        map.remove_layer("c").unwrap();
        map.remove_source("s").unwrap();
        assert!(!map.has_source("s"));
    }

    #[test]
    fn test_add_layer_before_inserts_below() {
        let mut map = HeadlessMap::new(2.0);
        map.load(vec![
            LayerSpec::new("background", LayerKind::Background),
            LayerSpec::new("labels", LayerKind::Symbol),
        ]);
        map.add_layer(LayerSpec::new("mid", LayerKind::Fill), Some("labels"))
            .unwrap();
        map.add_layer(LayerSpec::new("top", LayerKind::Fill), Some("nope"))
            .unwrap();
        assert_eq!(map.layer_ids(), vec!["background", "mid", "labels", "top"]);
    }

    #[test]
    fn test_failing_map_rejects_mutations() {
        let mut map = HeadlessMap::new(2.0);
        map.set_fail_mutations(true);
        assert!(map.add_source("s", geojson()).is_err());
        assert!(map.source_ids().is_empty());
    }

    #[test]
    fn test_ease_to_updates_zoom_and_camera() {
        let mut map = HeadlessMap::new(2.0);
        map.ease_to(CameraOptions {
            center: Coordinate::new(2.35, 48.85),
            zoom: 15.5,
            pitch: 45.0,
            bearing: -17.6,
            duration: Duration::from_millis(2000),
        })
        .unwrap();
        assert!((map.zoom() - 15.5).abs() < 1e-9);
        assert_eq!(map.camera().unwrap().center, Coordinate::new(2.35, 48.85));
    }

    #[test]
    fn test_style_json_lists_sources_and_layers() {
        let mut map = HeadlessMap::new(2.0);
        map.add_source("s", geojson()).unwrap();
        map.add_layer(circle("c", "s"), None).unwrap();
        let style = map.to_style_json();
        assert_eq!(style["version"], 8);
        assert_eq!(style["sources"]["s"]["type"], "geojson");
        assert_eq!(style["layers"][0]["id"], "c");
    }
}
