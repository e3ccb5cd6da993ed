use crate::models::map_types::{
    Appearance, Control, ControlPosition, MapPoint, MapView, MarkerEvent, Popup, DOT_COLOR,
    HIGHLIGHT_COLOR,
};
use crate::services::map_style::MapStyle;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Operations the host map widget provides.
pub trait MapSurface {
    type Marker;

    fn add_control(&mut self, control: Control);
    fn set_style(&mut self, style: &MapStyle);
    fn add_marker(&mut self, id: &str, at: [f64; 2], appearance: &Appearance) -> Self::Marker;
    fn update_marker(&mut self, marker: &Self::Marker, appearance: &Appearance);
    fn remove_marker(&mut self, marker: Self::Marker);
    fn show_popup(&mut self, id: &str, popup: &Popup);
    fn hide_popup(&mut self, id: &str);
    fn dispose(&mut self);
}

/// How a marker looks at rest and under the pointer.
pub trait MarkerVariant: Send + Sync {
    fn kind(&self) -> &'static str;
    fn resting(&self, point: &MapPoint, disable_hover: bool) -> Appearance;
    fn hovered(&self, point: &MapPoint) -> Appearance;
    fn popup_offset(&self) -> u32;
}

/// Circular thumbnail.
pub struct PhotoMarker;

/// Plain colored dot.
pub struct DotMarker;

impl MarkerVariant for PhotoMarker {
    fn kind(&self) -> &'static str {
        "photo"
    }

    fn resting(&self, point: &MapPoint, _disable_hover: bool) -> Appearance {
        Appearance {
            size_px: 50,
            border_width_px: 3,
            border_color: "white".to_string(),
            background: None,
            image: point.thumbnail.clone(),
            shadow: "0 4px 8px rgba(0,0,0,0.5)".to_string(),
            brightness: 1.0,
            cursor: "pointer".to_string(),
        }
    }

    fn hovered(&self, point: &MapPoint) -> Appearance {
        Appearance {
            border_color: point
                .color
                .clone()
                .unwrap_or_else(|| HIGHLIGHT_COLOR.to_string()),
            shadow: "0 6px 16px rgba(0,0,0,0.7)".to_string(),
            brightness: 1.2,
            ..self.resting(point, false)
        }
    }

    fn popup_offset(&self) -> u32 {
        35
    }
}

impl MarkerVariant for DotMarker {
    fn kind(&self) -> &'static str {
        "dot"
    }

    fn resting(&self, point: &MapPoint, disable_hover: bool) -> Appearance {
        Appearance {
            size_px: 20,
            border_width_px: 2,
            border_color: "white".to_string(),
            background: Some(point.color.clone().unwrap_or_else(|| DOT_COLOR.to_string())),
            image: None,
            shadow: "0 2px 4px rgba(0,0,0,0.3)".to_string(),
            brightness: 1.0,
            cursor: if disable_hover { "default" } else { "pointer" }.to_string(),
        }
    }

    fn hovered(&self, point: &MapPoint) -> Appearance {
        Appearance {
            shadow: "0 4px 8px rgba(0,0,0,0.5)".to_string(),
            brightness: 1.3,
            ..self.resting(point, false)
        }
    }

    fn popup_offset(&self) -> u32 {
        25
    }
}

pub fn variant_for(point: &MapPoint) -> &'static dyn MarkerVariant {
    if point.thumbnail.is_some() {
        &PhotoMarker
    } else {
        &DotMarker
    }
}

pub type HoverHandler = Box<dyn Fn(Option<&MapPoint>) + Send + Sync>;

struct PlacedMarker<M> {
    handle: M,
    point: MapPoint,
    variant: &'static dyn MarkerVariant,
}

/// Owns one map surface and keeps its markers equal to the last point set
/// it was given.
pub struct MarkerRenderer<S: MapSurface> {
    surface: Option<S>,
    view: MapView,
    markers: HashMap<String, PlacedMarker<S::Marker>>,
    on_hover: Option<HoverHandler>,
}

impl<S: MapSurface> MarkerRenderer<S> {
    pub fn new(mut surface: S, view: MapView) -> Self {
        surface.add_control(Control::Navigation(ControlPosition::TopRight));
        surface.set_style(&MapStyle::for_mode(view.dark_mode));
        Self {
            surface: Some(surface),
            view,
            markers: HashMap::new(),
            on_hover: None,
        }
    }

    pub fn on_hover(&mut self, handler: impl Fn(Option<&MapPoint>) + Send + Sync + 'static) {
        self.on_hover = Some(Box::new(handler));
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.view.dark_mode = dark_mode;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_style(&MapStyle::for_mode(dark_mode));
        }
    }

    /// Rebuild every marker from `points`. Later duplicates of an id are dropped.
    pub fn sync(&mut self, points: &[MapPoint]) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        for (id, placed) in self.markers.drain() {
            surface.hide_popup(&id);
            surface.remove_marker(placed.handle);
        }

        for point in points {
            if self.markers.contains_key(&point.id) {
                tracing::debug!("Skipping duplicate map point {}", point.id);
                continue;
            }
            let variant = variant_for(point);
            let appearance = variant.resting(point, self.view.disable_hover);
            let handle = surface.add_marker(&point.id, point.coordinates, &appearance);
            self.markers.insert(
                point.id.clone(),
                PlacedMarker {
                    handle,
                    point: point.clone(),
                    variant,
                },
            );
        }
        tracing::debug!("Rendered {} markers", self.markers.len());
    }

    /// Pointer events from the widget. Unknown ids are ignored.
    pub fn handle_event(&mut self, id: &str, event: MarkerEvent) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let Some(placed) = self.markers.get(id) else {
            return;
        };

        match event {
            MarkerEvent::Enter if !self.view.disable_hover => {
                surface.update_marker(&placed.handle, &placed.variant.hovered(&placed.point));
                surface.show_popup(
                    id,
                    &Popup {
                        at: placed.point.coordinates,
                        title: placed.point.title.clone(),
                        description: placed.point.description.clone(),
                        offset: placed.variant.popup_offset(),
                    },
                );
                if let Some(on_hover) = &self.on_hover {
                    on_hover(Some(&placed.point));
                }
            }
            MarkerEvent::Leave if !self.view.disable_hover => {
                surface.update_marker(&placed.handle, &placed.variant.resting(&placed.point, false));
                surface.hide_popup(id);
                if let Some(on_hover) = &self.on_hover {
                    on_hover(None);
                }
            }
            MarkerEvent::Click => {
                if let Some(on_click) = &placed.point.on_click {
                    on_click();
                }
            }
            MarkerEvent::Enter | MarkerEvent::Leave => {}
        }
    }

    pub fn marker_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.markers.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn marker_kind(&self, id: &str) -> Option<&'static str> {
        self.markers.get(id).map(|m| m.variant.kind())
    }

    /// Remove every marker and release the surface.
    pub fn dispose(&mut self) {
        let Some(mut surface) = self.surface.take() else {
            return;
        };
        for (id, placed) in self.markers.drain() {
            surface.hide_popup(&id);
            surface.remove_marker(placed.handle);
        }
        surface.dispose();
    }
}

impl<S: MapSurface> Drop for MarkerRenderer<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneMarker {
    pub id: String,
    pub at: [f64; 2],
    pub appearance: Appearance,
}

/// In-memory map surface. Records what a real widget would display.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneSurface {
    style: Option<MapStyle>,
    style_changes: usize,
    controls: Vec<Control>,
    markers: BTreeMap<u64, SceneMarker>,
    popups: BTreeMap<String, Popup>,
    #[serde(skip)]
    next_marker: u64,
    disposed: bool,
}

impl SceneSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(&self) -> Option<&MapStyle> {
        self.style.as_ref()
    }

    pub fn style_changes(&self) -> usize {
        self.style_changes
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn markers(&self) -> impl Iterator<Item = &SceneMarker> {
        self.markers.values()
    }

    pub fn marker(&self, id: &str) -> Option<&SceneMarker> {
        self.markers.values().find(|m| m.id == id)
    }

    pub fn popup(&self, id: &str) -> Option<&Popup> {
        self.popups.get(id)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl MapSurface for SceneSurface {
    type Marker = u64;

    fn add_control(&mut self, control: Control) {
        self.controls.push(control);
    }

    fn set_style(&mut self, style: &MapStyle) {
        self.style = Some(style.clone());
        self.style_changes += 1;
    }

    fn add_marker(&mut self, id: &str, at: [f64; 2], appearance: &Appearance) -> u64 {
        let handle = self.next_marker;
        self.next_marker += 1;
        self.markers.insert(
            handle,
            SceneMarker {
                id: id.to_string(),
                at,
                appearance: appearance.clone(),
            },
        );
        handle
    }

    fn update_marker(&mut self, marker: &u64, appearance: &Appearance) {
        if let Some(m) = self.markers.get_mut(marker) {
            m.appearance = appearance.clone();
        }
    }

    fn remove_marker(&mut self, marker: u64) {
        self.markers.remove(&marker);
    }

    fn show_popup(&mut self, id: &str, popup: &Popup) {
        self.popups.insert(id.to_string(), popup.clone());
    }

    fn hide_popup(&mut self, id: &str) {
        self.popups.remove(id);
    }

    fn dispose(&mut self) {
        self.markers.clear();
        self.popups.clear();
        self.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::archive_types::Coordinate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn point(id: &str) -> MapPoint {
        MapPoint::new(id, Coordinate::new(43.08, -77.67), id.replace('-', " "))
    }

    fn photo(id: &str) -> MapPoint {
        point(id)
            .with_color(HIGHLIGHT_COLOR)
            .with_thumbnail(Some(format!("/images/{}/1.jpg", id)))
    }

    fn scene_ids(surface: &SceneSurface) -> Vec<String> {
        let mut ids: Vec<_> = surface.markers().map(|m| m.id.clone()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn new_renderer_adds_navigation_and_style() {
        let renderer = MarkerRenderer::new(SceneSurface::new(), MapView::campus());
        let surface = renderer.surface().unwrap();
        assert_eq!(surface.controls(), &[Control::Navigation(ControlPosition::TopRight)]);
        assert_eq!(surface.style(), Some(&MapStyle::dark()));
    }

    #[test]
    fn sync_replaces_previous_point_set() {
        let mut renderer = MarkerRenderer::new(SceneSurface::new(), MapView::default());
        renderer.sync(&[point("A"), point("B"), point("C")]);
        assert_eq!(renderer.marker_ids(), vec!["A", "B", "C"]);

        renderer.sync(&[point("C"), point("D"), point("D")]);
        assert_eq!(renderer.marker_ids(), vec!["C", "D"]);
        assert_eq!(scene_ids(renderer.surface().unwrap()), vec!["C", "D"]);
    }

    #[test]
    fn variant_follows_thumbnail() {
        let mut renderer = MarkerRenderer::new(SceneSurface::new(), MapView::default());
        renderer.sync(&[photo("Gleason"), point("Dot")]);
        assert_eq!(renderer.marker_kind("Gleason"), Some("photo"));
        assert_eq!(renderer.marker_kind("Dot"), Some("dot"));

        let surface = renderer.surface().unwrap();
        assert_eq!(surface.marker("Gleason").unwrap().appearance.size_px, 50);
        let dot = &surface.marker("Dot").unwrap().appearance;
        assert_eq!(dot.size_px, 20);
        assert_eq!(dot.background.as_deref(), Some(DOT_COLOR));
    }

    #[test]
    fn hover_emphasizes_and_reports() {
        let hovered: Arc<Mutex<Vec<Option<String>>>> = Arc::default();
        let log = hovered.clone();

        let mut renderer = MarkerRenderer::new(SceneSurface::new(), MapView::default());
        renderer.on_hover(move |p| log.lock().unwrap().push(p.map(|p| p.id.clone())));
        renderer.sync(&[photo("Gleason").with_description("Engineering")]);

        renderer.handle_event("Gleason", MarkerEvent::Enter);
        {
            let surface = renderer.surface().unwrap();
            let marker = surface.marker("Gleason").unwrap();
            assert_eq!(marker.appearance.brightness, 1.2);
            assert_eq!(marker.appearance.border_color, HIGHLIGHT_COLOR);
            let popup = surface.popup("Gleason").unwrap();
            assert_eq!(popup.offset, 35);
            assert_eq!(popup.description.as_deref(), Some("Engineering"));
        }

        renderer.handle_event("Gleason", MarkerEvent::Leave);
        let surface = renderer.surface().unwrap();
        assert_eq!(surface.marker("Gleason").unwrap().appearance.brightness, 1.0);
        assert!(surface.popup("Gleason").is_none());
        assert_eq!(
            *hovered.lock().unwrap(),
            vec![Some("Gleason".to_string()), None]
        );
    }

    #[test]
    fn disabled_hover_ignores_pointer_but_keeps_clicks() {
        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = clicks.clone();
        let view = MapView {
            disable_hover: true,
            ..MapView::default()
        };

        let mut renderer = MarkerRenderer::new(SceneSurface::new(), view);
        renderer.sync(&[point("A").on_click(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })]);

        assert_eq!(renderer.surface().unwrap().marker("A").unwrap().appearance.cursor, "default");
        renderer.handle_event("A", MarkerEvent::Enter);
        assert!(renderer.surface().unwrap().popup("A").is_none());

        renderer.handle_event("A", MarkerEvent::Click);
        renderer.handle_event("missing", MarkerEvent::Click);
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn style_swap_replaces_document() {
        let mut renderer = MarkerRenderer::new(SceneSurface::new(), MapView::default());
        renderer.set_dark_mode(false);
        let surface = renderer.surface().unwrap();
        assert_eq!(surface.style(), Some(&MapStyle::light()));
        assert_eq!(surface.style_changes(), 2);
    }

    #[test]
    fn dispose_releases_everything() {
        let mut renderer = MarkerRenderer::new(SceneSurface::new(), MapView::default());
        renderer.sync(&[point("A")]);
        renderer.dispose();
        assert!(renderer.surface().is_none());
        assert!(renderer.marker_ids().is_empty());

        renderer.sync(&[point("B")]);
        assert!(renderer.marker_ids().is_empty());
    }
}
