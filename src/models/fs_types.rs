use serde::Serialize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
    Audio,
}

/// A media file found under the public directory.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PublicAsset {
    /// Bundler-style key, e.g. `/public/images/Gleason/1.jpg`.
    pub virtual_path: String,
    /// Served path relative to the site root, e.g. `/images/Gleason/1.jpg`.
    pub locator: String,
    pub kind: AssetKind,
}
