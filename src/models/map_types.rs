use crate::models::archive_types::Coordinate;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

pub type ClickHandler = Arc<dyn Fn() + Send + Sync>;

pub const CAMPUS_CENTER: [f64; 2] = [-77.67477774444974, 43.08457874853728];
pub const CAMPUS_BOUNDS: [[f64; 2]; 2] = [
    [-77.687152344477, 43.07849632215922],
    [-77.66416427991189, 43.09110258268279],
];
pub const HIGHLIGHT_COLOR: &str = "#f4d03f";
pub const DOT_COLOR: &str = "#3b82f6";

/// A renderable geocoded entity. `coordinates` are `[lng, lat]`.
#[derive(Clone, Serialize)]
pub struct MapPoint {
    pub id: String,
    pub coordinates: [f64; 2],
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Route the host navigates to on click.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip)]
    pub on_click: Option<ClickHandler>,
}

impl MapPoint {
    pub fn new(id: impl Into<String>, at: Coordinate, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            coordinates: at.lng_lat(),
            title: title.into(),
            description: None,
            color: None,
            thumbnail: None,
            link: None,
            on_click: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail;
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn on_click(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_click = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for MapPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapPoint")
            .field("id", &self.id)
            .field("coordinates", &self.coordinates)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("color", &self.color)
            .field("thumbnail", &self.thumbnail)
            .field("link", &self.link)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

/// Camera and interaction settings for one map instance.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: f64,
    pub bounds: Option<[[f64; 2]; 2]>,
    pub dark_mode: bool,
    pub disable_hover: bool,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: CAMPUS_CENTER,
            zoom: 15.0,
            bounds: None,
            dark_mode: true,
            disable_hover: false,
        }
    }
}

impl MapView {
    /// The full campus map page.
    pub fn campus() -> Self {
        Self {
            zoom: 16.0,
            bounds: Some(CAMPUS_BOUNDS),
            ..Self::default()
        }
    }

    /// Close-up map on a building page.
    pub fn detail(at: Coordinate) -> Self {
        Self {
            center: at.lng_lat(),
            zoom: 18.0,
            ..Self::default()
        }
    }
}

/// Visual state of a marker element.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Appearance {
    pub size_px: u32,
    pub border_width_px: u32,
    pub border_color: String,
    pub background: Option<String>,
    pub image: Option<String>,
    pub shadow: String,
    pub brightness: f32,
    pub cursor: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Popup {
    pub at: [f64; 2],
    pub title: String,
    pub description: Option<String>,
    pub offset: u32,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ControlPosition {
    TopRight,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Control {
    Navigation(ControlPosition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEvent {
    Enter,
    Leave,
    Click,
}
