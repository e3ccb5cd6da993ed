use serde::Serialize;
use serde_json::{json, Value};

const OSM_TILES: &[&str] = &[
    "https://a.tile.openstreetmap.org/{z}/{x}/{y}.png",
    "https://b.tile.openstreetmap.org/{z}/{x}/{y}.png",
    "https://c.tile.openstreetmap.org/{z}/{x}/{y}.png",
];

/// A complete style document for the map widget. Theme changes swap the
/// whole document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MapStyle(Value);

impl MapStyle {
    pub fn for_mode(dark_mode: bool) -> Self {
        let base_color = if dark_mode { "#1a1a1a" } else { "#f8f9fa" };
        let (opacity, brightness_min, brightness_max, contrast) = if dark_mode {
            (0.7, 0.3, 0.8, 0.2)
        } else {
            (1.0, 0.0, 1.0, 0.0)
        };

        MapStyle(json!({
            "version": 8,
            "sources": {
                "osm-raster": {
                    "type": "raster",
                    "tiles": OSM_TILES,
                    "tileSize": 256,
                    "attribution": "© OpenStreetMap contributors",
                }
            },
            "layers": [
                {
                    "id": "background",
                    "type": "background",
                    "paint": { "background-color": base_color },
                },
                {
                    "id": "osm-tiles",
                    "type": "raster",
                    "source": "osm-raster",
                    "paint": {
                        "raster-opacity": opacity,
                        "raster-brightness-min": brightness_min,
                        "raster-brightness-max": brightness_max,
                        "raster-contrast": contrast,
                    },
                },
            ],
        }))
    }

    pub fn dark() -> Self {
        Self::for_mode(true)
    }

    pub fn light() -> Self {
        Self::for_mode(false)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}
