use crate::error::AppError;
use crate::services::fs_service;
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only index of the archive's static content: virtual path to served
/// locator. Built from disk for the real archive, or from literal entries in
/// tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentManifest {
    entries: BTreeMap<String, String>,
}

impl ContentManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Paths double as locators, the way static files under `public/` are served.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self::from_entries(paths.into_iter().map(|p| {
            let p = p.into();
            (p.clone(), p)
        }))
    }

    pub fn from_public_dir(public_dir: &Path) -> Result<Self, AppError> {
        let assets = fs_service::list_public_assets(public_dir)?;
        tracing::info!(
            "Indexed {} assets from {}",
            assets.len(),
            public_dir.display()
        );
        Ok(Self::from_entries(
            assets.into_iter().map(|a| (a.virtual_path, a.locator)),
        ))
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
