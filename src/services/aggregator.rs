use crate::models::archive_types::{
    Building, BuildingDetail, BuildingItem, Coordinate, Filter, GalleryItem, Interview, SortMode,
};
use crate::models::map_types::{MapPoint, MapView, HIGHLIGHT_COLOR};
use crate::services::scanner;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

pub const NO_PHOTOS: &str = "No photos available for this building";

/// Seed for every randomized choice shown on screen. Only changes when a
/// shuffle is explicitly triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShuffleSeed {
    pub generation: u64,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct Shuffle {
    current: ShuffleSeed,
}

impl Default for Shuffle {
    fn default() -> Self {
        Self::with_seed(rand::random())
    }
}

impl Shuffle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            current: ShuffleSeed { generation: 0, seed },
        }
    }

    pub fn current(&self) -> ShuffleSeed {
        self.current
    }

    pub fn trigger(&mut self) -> ShuffleSeed {
        self.current = ShuffleSeed {
            generation: self.current.generation + 1,
            seed: rand::random(),
        };
        tracing::debug!("Shuffle generation {}", self.current.generation);
        self.current
    }
}

// FNV-1a, so each scope gets its own stable stream from one seed.
fn scope_hash(scope: &str) -> u64 {
    scope.bytes().fold(0xcbf29ce484222325_u64, |hash, b| {
        (hash ^ b as u64).wrapping_mul(0x100000001b3)
    })
}

fn rng_for(seed: ShuffleSeed, scope: &str) -> StdRng {
    StdRng::seed_from_u64(seed.seed ^ scope_hash(scope))
}

/// A permutation of `items` fixed by `seed` and `scope`. The input is untouched.
pub fn shuffled<T: Clone>(items: &[T], seed: ShuffleSeed, scope: &str) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(&mut rng_for(seed, scope));
    out
}

/// Attach whatever coordinates have resolved so far to the scanned groups.
pub fn merge_buildings(
    groups: &BTreeMap<String, Vec<String>>,
    coordinates: &HashMap<String, Coordinate>,
) -> Vec<Building> {
    groups
        .iter()
        .map(|(id, images)| Building {
            id: id.clone(),
            name: scanner::humanize(id),
            images: images.clone(),
            coordinates: coordinates.get(id).copied(),
        })
        .collect()
}

pub fn cover_image(building: &Building, seed: ShuffleSeed) -> Option<&String> {
    building.images.choose(&mut rng_for(seed, &building.id))
}

pub fn building_item(building: &Building, seed: ShuffleSeed) -> BuildingItem {
    BuildingItem {
        id: building.id.clone(),
        name: building.name.clone(),
        image: cover_image(building, seed).cloned(),
        total_images: building.images.len(),
        location: building.name.clone(),
        coordinates: building.coordinates,
    }
}

/// Case-folded comparison first, raw string as tiebreak.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn gallery_items(
    buildings: &[Building],
    interviews: &[Interview],
    filter: Filter,
    sort: SortMode,
    seed: ShuffleSeed,
) -> Vec<GalleryItem> {
    let mut items: Vec<GalleryItem> = Vec::with_capacity(buildings.len() + interviews.len());

    if filter.includes_buildings() {
        items.extend(
            buildings
                .iter()
                .map(|b| GalleryItem::Building(building_item(b, seed))),
        );
    }
    if filter.includes_interviews() {
        items.extend(interviews.iter().cloned().map(GalleryItem::Interview));
    }

    match sort {
        SortMode::Alphabetical => items.sort_by(|a, b| compare_names(a.name(), b.name())),
        SortMode::Random => items.shuffle(&mut rng_for(seed, "gallery")),
    }

    items
}

pub fn building_route(id: &str) -> String {
    format!("/building/{}", id)
}

/// One photo marker per building that has coordinates.
pub fn map_points(buildings: &[Building], seed: ShuffleSeed) -> Vec<MapPoint> {
    buildings
        .iter()
        .filter_map(|b| {
            let at = b.coordinates?;
            Some(
                MapPoint::new(b.id.clone(), at, b.name.clone())
                    .with_color(HIGHLIGHT_COLOR)
                    .with_thumbnail(cover_image(b, seed).cloned())
                    .with_link(building_route(&b.id)),
            )
        })
        .collect()
}

pub fn photo_count_label(count: usize) -> String {
    match count {
        0 => NO_PHOTOS.to_string(),
        1 => "1 photo".to_string(),
        n => format!("{} photos", n),
    }
}

pub fn building_detail(
    id: &str,
    images: &[String],
    coordinates: Option<Coordinate>,
    seed: ShuffleSeed,
) -> BuildingDetail {
    let name = scanner::humanize(id);
    let point = coordinates
        .map(|at| MapPoint::new(id, at, name.clone()).with_color(HIGHLIGHT_COLOR));

    BuildingDetail {
        id: id.to_string(),
        images: shuffled(images, seed, id),
        photo_count: photo_count_label(images.len()),
        coordinates,
        location_label: coordinates.map(|c| c.to_string()),
        point,
        map: coordinates.map(MapView::detail),
        name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::archive_types::MediaKind;

    fn building(id: &str, images: usize, at: Option<Coordinate>) -> Building {
        Building {
            id: id.to_string(),
            name: scanner::humanize(id),
            images: (0..images).map(|i| format!("/images/{}/{}.jpg", id, i)).collect(),
            coordinates: at,
        }
    }

    fn interview(index: usize, name: &str) -> Interview {
        Interview {
            id: format!("interview-{}", index),
            name: name.to_string(),
            media_kind: MediaKind::Audio,
            url: format!("/interviews/{}.mp3", name),
            thumbnail: None,
        }
    }

    fn fixtures() -> (Vec<Building>, Vec<Interview>) {
        let buildings = vec![
            building("Wallace-Library", 4, Some(Coordinate::new(43.0838, -77.6761))),
            building("booth_hall", 2, None),
            building("Gleason", 3, Some(Coordinate::new(43.0845, -77.6747))),
        ];
        let interviews = vec![interview(0, "zoe"), interview(1, "Alex")];
        (buildings, interviews)
    }

    #[test]
    fn alphabetical_is_case_folded_and_idempotent() {
        let (buildings, interviews) = fixtures();
        let seed = Shuffle::with_seed(1).current();
        let first = gallery_items(&buildings, &interviews, Filter::All, SortMode::Alphabetical, seed);
        let names: Vec<_> = first.iter().map(|i| i.name().to_string()).collect();
        assert_eq!(names, vec!["Alex", "booth hall", "Gleason", "Wallace Library", "zoe"]);

        let second = gallery_items(&buildings, &interviews, Filter::All, SortMode::Alphabetical, seed);
        assert_eq!(first, second);
    }

    #[test]
    fn filter_selects_categories() {
        let (buildings, interviews) = fixtures();
        let seed = Shuffle::with_seed(1).current();
        let only_buildings = gallery_items(&buildings, &interviews, Filter::Buildings, SortMode::Alphabetical, seed);
        assert!(only_buildings.iter().all(|i| matches!(i, GalleryItem::Building(_))));
        assert_eq!(only_buildings.len(), 3);

        let only_interviews = gallery_items(&buildings, &interviews, Filter::Interviews, SortMode::Alphabetical, seed);
        assert!(only_interviews.iter().all(|i| matches!(i, GalleryItem::Interview(_))));
        assert_eq!(only_interviews.len(), 2);
    }

    #[test]
    fn random_order_is_stable_until_triggered() {
        let (buildings, interviews) = fixtures();
        let before = (buildings.clone(), interviews.clone());
        let mut shuffle = Shuffle::with_seed(42);

        let a = gallery_items(&buildings, &interviews, Filter::All, SortMode::Random, shuffle.current());
        let b = gallery_items(&buildings, &interviews, Filter::All, SortMode::Random, shuffle.current());
        assert_eq!(a, b);

        let mut changed = false;
        for _ in 0..20 {
            let seed = shuffle.trigger();
            let c = gallery_items(&buildings, &interviews, Filter::All, SortMode::Random, seed);
            assert_eq!(c.len(), a.len());
            if c.iter().map(|i| i.id()).ne(a.iter().map(|i| i.id())) {
                changed = true;
                break;
            }
        }
        assert!(changed, "reshuffling never produced a new order");
        assert_eq!((buildings, interviews), before);
        assert!(shuffle.current().generation >= 1);
    }

    #[test]
    fn cover_image_stays_within_building() {
        let (buildings, _) = fixtures();
        let seed = Shuffle::with_seed(7).current();
        let item = building_item(&buildings[0], seed);
        assert_eq!(item.total_images, 4);
        assert!(buildings[0].images.contains(item.image.as_ref().unwrap()));
        assert_eq!(item.location, "Wallace Library");

        let empty = building("Empty", 0, None);
        assert_eq!(building_item(&empty, seed).image, None);
    }

    #[test]
    fn map_points_skip_buildings_without_coordinates() {
        let (buildings, _) = fixtures();
        let points = map_points(&buildings, Shuffle::with_seed(3).current());
        let ids: Vec<_> = points.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["Wallace-Library", "Gleason"]);

        let gleason = &points[1];
        assert_eq!(gleason.coordinates, [-77.6747, 43.0845]);
        assert_eq!(gleason.title, "Gleason");
        assert_eq!(gleason.link.as_deref(), Some("/building/Gleason"));
        assert!(gleason.thumbnail.is_some());
    }

    #[test]
    fn merge_uses_partial_coordinates() {
        let mut groups = BTreeMap::new();
        groups.insert("A".to_string(), vec!["/images/A/1.jpg".to_string()]);
        groups.insert("B".to_string(), vec![]);
        let mut coords = HashMap::new();
        coords.insert("B".to_string(), Coordinate::new(1.0, 2.0));

        let merged = merge_buildings(&groups, &coords);
        assert_eq!(merged[0].coordinates, None);
        assert_eq!(merged[1].coordinates, Some(Coordinate::new(1.0, 2.0)));
    }

    #[test]
    fn photo_count_wording() {
        assert_eq!(photo_count_label(0), NO_PHOTOS);
        assert_eq!(photo_count_label(1), "1 photo");
        assert_eq!(photo_count_label(12), "12 photos");
    }

    #[test]
    fn detail_without_coordinates_has_no_point() {
        let seed = Shuffle::with_seed(9).current();
        let images = vec!["/images/A/1.jpg".to_string(), "/images/A/2.jpg".to_string()];
        let detail = building_detail("Student_Union", &images, None, seed);
        assert_eq!(detail.name, "Student Union");
        assert_eq!(detail.photo_count, "2 photos");
        assert!(detail.point.is_none());
        assert!(detail.location_label.is_none());
        assert!(detail.map.is_none());

        let located = building_detail("A", &images, Some(Coordinate::new(43.084579, -77.674778)), seed);
        assert_eq!(located.location_label.as_deref(), Some("43.084579, -77.674778"));
        assert!(located.point.unwrap().thumbnail.is_none());
        let map = located.map.unwrap();
        assert_eq!(map.center, [-77.674778, 43.084579]);
        assert_eq!(map.zoom, 18.0);
    }
}
