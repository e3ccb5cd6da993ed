use crate::models::archive_types::{Interview, MediaKind};
use crate::models::fs_types::AssetKind;
use crate::services::fs_service;
use crate::services::manifest::ContentManifest;
use std::collections::{BTreeMap, BTreeSet};

pub const IMAGES_ROOT: &str = "images";
pub const INTERVIEWS_ROOT: &str = "interviews";
const PUBLIC_ROOT: &str = "public";

/// Normalize a deployment base path so it ends in exactly one `/`.
pub fn public_base(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

/// Rebase a served locator under a normalized public base.
pub fn asset_url(base: &str, locator: &str) -> String {
    let clean = locator.strip_prefix('/').unwrap_or(locator);
    format!("{}{}", base, clean)
}

pub fn humanize(id: &str) -> String {
    id.replace(['-', '_'], " ")
}

/// The directory segment right after `images/`, if the path names a file
/// inside such a directory.
pub fn entity_id(path: &str) -> Option<&str> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let root = segments.iter().position(|s| *s == IMAGES_ROOT)?;
    // need <id> and at least one segment below it
    if root + 2 < segments.len() {
        Some(segments[root + 1])
    } else {
        None
    }
}

/// Group every image in the manifest by entity id, keeping manifest order
/// within each group.
pub fn scan_buildings(manifest: &ContentManifest, base: &str) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (path, locator) in manifest.iter() {
        if !fs_service::is_image_file(path) {
            continue;
        }
        if let Some(id) = entity_id(path) {
            groups
                .entry(id.to_string())
                .or_default()
                .push(asset_url(base, locator));
        }
    }

    tracing::debug!("Scanned {} buildings", groups.len());
    groups
}

pub fn entity_ids(manifest: &ContentManifest) -> BTreeSet<String> {
    manifest
        .iter()
        .filter(|(path, _)| fs_service::is_image_file(path))
        .filter_map(|(path, _)| entity_id(path).map(str::to_string))
        .collect()
}

pub fn building_images(manifest: &ContentManifest, base: &str, id: &str) -> Vec<String> {
    manifest
        .iter()
        .filter(|(path, _)| fs_service::is_image_file(path) && entity_id(path) == Some(id))
        .map(|(_, locator)| asset_url(base, locator))
        .collect()
}

fn file_stem(path: &str) -> &str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

// `interviews/<file>` at the top of the public tree, nowhere else.
fn is_interview_path(path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let rest = match segments.split_first() {
        Some((&PUBLIC_ROOT, rest)) => rest,
        _ => &segments[..],
    };
    matches!(rest, [root, _] if *root == INTERVIEWS_ROOT)
}

/// Recordings sitting directly under `interviews/`.
pub fn scan_interviews(manifest: &ContentManifest, base: &str) -> Vec<Interview> {
    manifest
        .iter()
        .filter(|(path, _)| is_interview_path(path))
        .filter_map(|(path, locator)| {
            let media_kind = match fs_service::asset_kind(path)? {
                AssetKind::Video => MediaKind::Video,
                AssetKind::Audio => MediaKind::Audio,
                AssetKind::Image => return None,
            };
            Some((path, locator, media_kind))
        })
        .enumerate()
        .map(|(index, (path, locator, media_kind))| {
            let url = asset_url(base, locator);
            Interview {
                id: format!("interview-{}", index),
                name: humanize(file_stem(path)),
                media_kind,
                thumbnail: (media_kind == MediaKind::Video).then(|| url.clone()),
                url,
            }
        })
        .collect()
}

/// Every building image, for the home carousel.
pub fn all_images(manifest: &ContentManifest, base: &str) -> Vec<String> {
    manifest
        .iter()
        .filter(|(path, _)| fs_service::is_image_file(path) && entity_id(path).is_some())
        .map(|(_, locator)| asset_url(base, locator))
        .collect()
}
