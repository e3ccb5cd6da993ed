use crate::error::AppError;
use crate::models::fs_types::{AssetKind, PublicAsset};
use std::path::Path;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "ogg"];

fn extension_of(path: &str) -> Option<String> {
    let file_name = path.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

pub fn asset_kind(path: &str) -> Option<AssetKind> {
    let ext = extension_of(path)?;
    let ext = ext.as_str();
    if IMAGE_EXTENSIONS.contains(&ext) {
        Some(AssetKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        Some(AssetKind::Video)
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        Some(AssetKind::Audio)
    } else {
        None
    }
}

pub fn is_image_file(path: &str) -> bool {
    asset_kind(path) == Some(AssetKind::Image)
}

/// Walk the public directory and collect every media file it serves.
///
/// Hidden files and folders are skipped. Paths use `/` separators regardless
/// of platform and are sorted so repeated scans agree.
pub fn list_public_assets(public_dir: &Path) -> Result<Vec<PublicAsset>, AppError> {
    if !public_dir.is_dir() {
        return Err(AppError::NotFound(format!(
            "public directory {}",
            public_dir.display()
        )));
    }

    let mut assets = Vec::new();

    let walker = WalkDir::new(public_dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let rel = match entry.path().strip_prefix(public_dir) {
            Ok(r) => r,
            Err(_) => continue,
        };
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let Some(kind) = asset_kind(&rel) else {
            continue;
        };

        assets.push(PublicAsset {
            virtual_path: format!("/public/{}", rel),
            locator: format!("/{}", rel),
            kind,
        });
    }

    assets.sort_by(|a, b| a.virtual_path.cmp(&b.virtual_path));
    tracing::debug!(
        "Found {} media files under {}",
        assets.len(),
        public_dir.display()
    );
    Ok(assets)
}
