use airmap_shared::color::{category_for_aqi, color_for_aqi};
use airmap_shared::format::format_overlay_label;
use airmap_shared::models::{AirQualityIndex, PollutantReading};
use serde_json::{json, Value};

use crate::map::{LayerKind, LayerSpec, SourceSpec};

pub const POLLUTION_SOURCE_ID: &str = "pollution";
pub const POLLUTION_CIRCLE_LAYER_ID: &str = "pollution-circle";
pub const POLLUTION_LABEL_LAYER_ID: &str = "pollution-label";

/// Overlay layers, top-most last. Removal walks this in reverse.
pub const POLLUTION_LAYER_IDS: [&str; 2] = [POLLUTION_CIRCLE_LAYER_ID, POLLUTION_LABEL_LAYER_ID];

pub const BUILDINGS_SOURCE_ID: &str = "openmaptiles";
pub const BUILDINGS_LAYER_ID: &str = "3d-buildings";

/// (zoom, radius px) stops for the overlay circle.
pub const RADIUS_STOPS: [(f64, f64); 2] = [(10.0, 20.0), (15.0, 60.0)];

/// Point source carrying the reading and derived index as feature properties.
pub fn pollution_source(reading: &PollutantReading, aqi: AirQualityIndex) -> SourceSpec {
    let color = color_for_aqi(aqi);
    SourceSpec::Geojson {
        data: json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": reading.coordinate.to_lng_lat(),
                },
                "properties": {
                    "aqi": aqi.value(),
                    "category": category_for_aqi(aqi).to_string(),
                    "color": color.to_hex(),
                    "opacity": color.opacity,
                    "co": reading.co,
                    "no2": reading.no2,
                    "o3": reading.o3,
                    "pm2_5": reading.pm2_5,
                    "pm10": reading.pm10,
                    "provider_aqi": reading.provider_index,
                    "label": format_overlay_label(reading, aqi),
                },
            }],
        }),
    }
}

fn radius_expression() -> Value {
    let [(z0, r0), (z1, r1)] = RADIUS_STOPS;
    json!(["interpolate", ["linear"], ["zoom"], z0, r0, z1, r1])
}

pub fn pollution_circle_layer(aqi: AirQualityIndex) -> LayerSpec {
    let color = color_for_aqi(aqi);
    let mut layer = LayerSpec::new(POLLUTION_CIRCLE_LAYER_ID, LayerKind::Circle);
    layer.source = Some(POLLUTION_SOURCE_ID.to_string());
    layer.paint = json!({
        "circle-radius": radius_expression(),
        "circle-color": color.to_hex(),
        "circle-opacity": color.opacity,
        "circle-stroke-width": 1,
        "circle-stroke-color": "#ffffff",
    });
    layer
}

pub fn pollution_label_layer() -> LayerSpec {
    let mut layer = LayerSpec::new(POLLUTION_LABEL_LAYER_ID, LayerKind::Symbol);
    layer.source = Some(POLLUTION_SOURCE_ID.to_string());
    layer.layout = json!({
        "text-field": ["get", "label"],
        "text-size": 12,
        "text-offset": [0, 3],
        "text-anchor": "top",
        "text-allow-overlap": true,
    });
    layer.paint = json!({
        "text-color": "#222222",
        "text-halo-color": "#ffffff",
        "text-halo-width": 1.5,
    });
    layer
}

pub fn buildings_source(tiles_url: String) -> SourceSpec {
    SourceSpec::Vector { url: tiles_url }
}

/// Extruded buildings from the OpenMapTiles `building` layer, visible from zoom 15.
pub fn buildings_layer() -> LayerSpec {
    let mut layer = LayerSpec::new(BUILDINGS_LAYER_ID, LayerKind::FillExtrusion);
    layer.source = Some(BUILDINGS_SOURCE_ID.to_string());
    layer.source_layer = Some("building".to_string());
    layer.minzoom = Some(15.0);
    layer.filter = Some(json!(["!=", ["get", "hide_3d"], true]));
    layer.paint = json!({
        "fill-extrusion-color": [
            "interpolate", ["linear"], ["get", "render_height"],
            0, "lightgray",
            200, "royalblue",
            400, "lightblue"
        ],
        "fill-extrusion-height": [
            "interpolate", ["linear"], ["zoom"],
            15, 0,
            16, ["get", "render_height"]
        ],
        "fill-extrusion-base": [
            "case",
            [">=", ["get", "zoom"], 16],
            ["get", "render_min_height"],
            0
        ],
    });
    layer
}

/// Id of the first text label layer, so extrusions can sit beneath labels.
pub fn first_label_layer_id(layers: &[LayerSpec]) -> Option<String> {
    layers
        .iter()
        .find(|l| l.is_text_label())
        .map(|l| l.id.clone())
}
