use crate::models::archive_types::{Filter, GalleryItem, SortMode};
use crate::services::aggregator::{self, ShuffleSeed};
use crate::services::scanner;
use crate::state::AppState;

pub fn list_gallery(state: &AppState, filter: Filter, sort: SortMode) -> Vec<GalleryItem> {
    aggregator::gallery_items(
        &state.buildings(),
        &state.interviews(),
        filter,
        sort,
        state.shuffle_seed(),
    )
}

/// The only way random orderings and cover images change.
pub fn shuffle_gallery(state: &AppState) -> ShuffleSeed {
    state.trigger_shuffle()
}

pub fn list_carousel(state: &AppState) -> Vec<String> {
    let images = scanner::all_images(&state.manifest(), &state.base());
    aggregator::shuffled(&images, state.shuffle_seed(), "carousel")
}
