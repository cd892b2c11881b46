//! The slice of the mapping library the overlay code talks to.
//!
//! Source and layer specs serialize to the style-spec JSON the browser map
//! expects, so a binding can forward them unchanged.

use std::time::Duration;

use airmap_shared::models::Coordinate;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceSpec {
    Geojson { data: Value },
    Vector { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    Background,
    Fill,
    Line,
    Circle,
    Symbol,
    FillExtrusion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub layout: Value,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub paint: Value,
}

impl LayerSpec {
    pub fn new(id: &str, kind: LayerKind) -> Self {
        LayerSpec {
            id: id.to_string(),
            kind,
            source: None,
            source_layer: None,
            minzoom: None,
            filter: None,
            layout: Value::Null,
            paint: Value::Null,
        }
    }

    /// Symbol layer that renders text, i.e. a place or road label.
    pub fn is_text_label(&self) -> bool {
        self.kind == LayerKind::Symbol && self.layout.get("text-field").is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraOptions {
    pub center: Coordinate,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub duration: Duration,
}

pub trait MapView {
    /// Style and initial tiles are ready; mutations before this are unsafe.
    fn is_loaded(&self) -> bool;

    fn zoom(&self) -> f64;

    fn has_source(&self, id: &str) -> bool;

    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<()>;

    /// Fails while any layer still reads from the source.
    fn remove_source(&mut self, id: &str) -> Result<()>;

    fn has_layer(&self, id: &str) -> bool;

    /// Insert `layer` below `before`, or on top when `before` is `None` or unknown.
    fn add_layer(&mut self, layer: LayerSpec, before: Option<&str>) -> Result<()>;

    fn remove_layer(&mut self, id: &str) -> Result<()>;

    /// Current style layers, bottom to top.
    fn style_layers(&self) -> Vec<LayerSpec>;

    fn ease_to(&mut self, camera: CameraOptions) -> Result<()>;
}
