use crate::config::ArchiveConfig;
use crate::error::AppError;
use crate::models::archive_types::{Building, Interview};
use crate::services::aggregator::{self, Shuffle, ShuffleSeed};
use crate::services::coordinates::{ArchiveSource, CoordinateCache, CoordinateLoader};
use crate::services::manifest::ContentManifest;
use crate::services::scanner;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Everything the views read from. The manifest is swapped wholesale on
/// rescan; coordinates fill in as they resolve.
pub struct AppState {
    config: ArchiveConfig,
    manifest: RwLock<Arc<ContentManifest>>,
    coordinates: CoordinateCache,
    shuffle: Mutex<Shuffle>,
}

impl AppState {
    pub fn new(config: ArchiveConfig, manifest: ContentManifest) -> Self {
        Self {
            config,
            manifest: RwLock::new(Arc::new(manifest)),
            coordinates: CoordinateCache::new(),
            shuffle: Mutex::new(Shuffle::new()),
        }
    }

    pub fn from_config(config: ArchiveConfig) -> Result<Self, AppError> {
        let manifest = ContentManifest::from_public_dir(&config.public_dir)?;
        Ok(Self::new(config, manifest))
    }

    pub fn with_shuffle_seed(self, seed: u64) -> Self {
        *self.shuffle.lock().unwrap_or_else(PoisonError::into_inner) = Shuffle::with_seed(seed);
        self
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    pub fn base(&self) -> String {
        self.config.public_base()
    }

    pub fn manifest(&self) -> Arc<ContentManifest> {
        self.manifest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace_manifest(&self, manifest: ContentManifest) {
        *self.manifest.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(manifest);
    }

    /// Re-index the public directory. Returns the number of assets found.
    pub fn rescan(&self) -> Result<usize, AppError> {
        let manifest = ContentManifest::from_public_dir(&self.config.public_dir)?;
        let count = manifest.len();
        self.replace_manifest(manifest);
        Ok(count)
    }

    pub fn coordinates(&self) -> &CoordinateCache {
        &self.coordinates
    }

    pub fn loader(&self) -> CoordinateLoader<ArchiveSource> {
        CoordinateLoader::new(
            ArchiveSource::from_config(&self.config),
            self.config.fetch_concurrency,
        )
    }

    pub fn shuffle_seed(&self) -> ShuffleSeed {
        self.shuffle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current()
    }

    pub fn trigger_shuffle(&self) -> ShuffleSeed {
        self.shuffle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .trigger()
    }

    pub fn entity_ids(&self) -> BTreeSet<String> {
        scanner::entity_ids(&self.manifest())
    }

    /// Scanned buildings with the coordinates resolved so far.
    pub fn buildings(&self) -> Vec<Building> {
        let groups = scanner::scan_buildings(&self.manifest(), &self.base());
        aggregator::merge_buildings(&groups, &self.coordinates.snapshot())
    }

    pub fn interviews(&self) -> Vec<Interview> {
        scanner::scan_interviews(&self.manifest(), &self.base())
    }
}
