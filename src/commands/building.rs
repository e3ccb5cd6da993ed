use crate::error::AppError;
use crate::models::archive_types::BuildingDetail;
use crate::services::{aggregator, coordinates, scanner};
use crate::state::AppState;

/// Building page data. Coordinates come from the cache, or are fetched for
/// this building alone when not resolved yet.
pub async fn get_building(state: &AppState, id: &str) -> Result<BuildingDetail, AppError> {
    if id.is_empty() || id.contains('/') {
        return Err(AppError::NotFound(format!("building {:?}", id)));
    }

    let images = scanner::building_images(&state.manifest(), &state.base(), id);

    let location = match state.coordinates().get(id) {
        Some(c) => Some(c),
        None => {
            let source = coordinates::ArchiveSource::from_config(state.config());
            let resolved = coordinates::resolve(&source, id).await;
            if let Some(c) = resolved {
                state.coordinates().insert(id, c);
            }
            resolved
        }
    };

    Ok(aggregator::building_detail(
        id,
        &images,
        location,
        state.shuffle_seed(),
    ))
}
