use crate::models::map_types::{MapPoint, MapView};
use crate::services::aggregator;
use crate::services::map_style::MapStyle;
use crate::services::markers::{MarkerRenderer, SceneSurface};
use crate::state::AppState;

/// Fetch every sidecar and wait for all of them. Returns how many resolved.
pub async fn resolve_coordinates(state: &AppState) -> usize {
    state
        .loader()
        .load_all(state.entity_ids(), state.coordinates())
        .await
}

pub fn list_map_points(state: &AppState) -> Vec<MapPoint> {
    aggregator::map_points(&state.buildings(), state.shuffle_seed())
}

/// Render the campus map, re-syncing markers after every settled fetch so
/// the scene always matches the current point set. Returns the final scene.
pub async fn render_map(state: &AppState, view: MapView) -> SceneSurface {
    let mut renderer = MarkerRenderer::new(SceneSurface::new(), view);
    renderer.sync(&list_map_points(state));

    let mut updates = state.loader().spawn(state.entity_ids(), state.coordinates());
    while let Some(update) = updates.recv().await {
        tracing::debug!("Coordinates settled for {}", update.id);
        renderer.sync(&list_map_points(state));
    }

    tracing::info!("Map rendered with {} markers", renderer.marker_ids().len());
    renderer.surface().cloned().unwrap_or_default()
}

pub fn map_style(dark_mode: bool) -> MapStyle {
    MapStyle::for_mode(dark_mode)
}
