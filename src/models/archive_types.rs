use crate::models::map_types::{MapPoint, MapView};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic position in decimal degrees.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Map surfaces take positions as `[lng, lat]`.
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// A campus location and its photo set, keyed by directory name.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Building {
    pub id: String,
    pub name: String,
    pub images: Vec<String>,
    pub coordinates: Option<Coordinate>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Interview {
    pub id: String,
    pub name: String,
    pub media_kind: MediaKind,
    pub url: String,
    pub thumbnail: Option<String>,
}

/// Card data for a building in the gallery grid.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BuildingItem {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub total_images: usize,
    pub location: String,
    pub coordinates: Option<Coordinate>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GalleryItem {
    Building(BuildingItem),
    Interview(Interview),
}

impl GalleryItem {
    pub fn id(&self) -> &str {
        match self {
            GalleryItem::Building(b) => &b.id,
            GalleryItem::Interview(i) => &i.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GalleryItem::Building(b) => &b.name,
            GalleryItem::Interview(i) => &i.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Buildings,
    Interviews,
}

impl Filter {
    pub fn includes_buildings(self) -> bool {
        matches!(self, Filter::All | Filter::Buildings)
    }

    pub fn includes_interviews(self) -> bool {
        matches!(self, Filter::All | Filter::Interviews)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Alphabetical,
    Random,
}

/// Everything the building page shows.
#[derive(Debug, Serialize, Clone)]
pub struct BuildingDetail {
    pub id: String,
    pub name: String,
    pub images: Vec<String>,
    pub photo_count: String,
    pub coordinates: Option<Coordinate>,
    pub location_label: Option<String>,
    pub point: Option<MapPoint>,
    pub map: Option<MapView>,
}
