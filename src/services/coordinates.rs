use crate::config::ArchiveConfig;
use crate::error::AppError;
use crate::models::archive_types::Coordinate;
use crate::services::scanner::{self, IMAGES_ROOT};
use futures::StreamExt;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tokio::sync::mpsc;

pub const SIDECAR_FILE: &str = "coordinates.txt";

/// Parse a `"<lat>,<lng>"` sidecar body.
pub fn parse_coordinates(text: &str) -> Option<Coordinate> {
    let mut fields = text.trim().split(',');
    let lat = parse_field(fields.next()?)?;
    let lng = parse_field(fields.next()?)?;
    if fields.next().is_some() {
        return None;
    }
    Some(Coordinate::new(lat, lng))
}

fn parse_field(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Where sidecars come from. `Ok(None)` means the sidecar does not exist.
pub trait CoordinateSource: Send + Sync {
    fn location(&self, id: &str) -> String;

    fn fetch(&self, id: &str) -> impl Future<Output = Result<Option<String>, AppError>> + Send;
}

/// Fetches sidecars over HTTP(S) from the deployed site.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    site_root: String,
}

impl HttpSource {
    /// `origin` is scheme + host (`https://example.edu`), `base` the public base path.
    pub fn new(origin: &str, base: &str) -> Self {
        Self::with_client(reqwest::Client::new(), origin, base)
    }

    pub fn with_client(client: reqwest::Client, origin: &str, base: &str) -> Self {
        let site_root = format!(
            "{}{}",
            origin.trim_end_matches('/'),
            scanner::public_base(base)
        );
        Self { client, site_root }
    }
}

impl CoordinateSource for HttpSource {
    fn location(&self, id: &str) -> String {
        format!("{}{}/{}/{}", self.site_root, IMAGES_ROOT, id, SIDECAR_FILE)
    }

    async fn fetch(&self, id: &str) -> Result<Option<String>, AppError> {
        let url = self.location(id);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(Some(response.text().await?))
    }
}

/// Reads sidecars straight from the public directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    public_dir: PathBuf,
}

impl FsSource {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    fn path(&self, id: &str) -> PathBuf {
        self.public_dir.join(IMAGES_ROOT).join(id).join(SIDECAR_FILE)
    }
}

impl CoordinateSource for FsSource {
    fn location(&self, id: &str) -> String {
        self.path(id).display().to_string()
    }

    async fn fetch(&self, id: &str) -> Result<Option<String>, AppError> {
        match tokio::fs::read_to_string(self.path(id)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// The source an archive is configured for: its deployed site when an
/// origin is set, otherwise the local public directory.
#[derive(Clone)]
pub enum ArchiveSource {
    Http(HttpSource),
    Fs(FsSource),
}

impl ArchiveSource {
    pub fn from_config(config: &ArchiveConfig) -> Self {
        match &config.origin {
            Some(origin) => ArchiveSource::Http(HttpSource::new(origin, &config.base_url)),
            None => ArchiveSource::Fs(FsSource::new(&config.public_dir)),
        }
    }
}

impl CoordinateSource for ArchiveSource {
    fn location(&self, id: &str) -> String {
        match self {
            ArchiveSource::Http(s) => s.location(id),
            ArchiveSource::Fs(s) => s.location(id),
        }
    }

    async fn fetch(&self, id: &str) -> Result<Option<String>, AppError> {
        match self {
            ArchiveSource::Http(s) => s.fetch(id).await,
            ArchiveSource::Fs(s) => s.fetch(id).await,
        }
    }
}

/// Resolve one entity. Every failure ends as `None` with a warning.
pub async fn resolve<S: CoordinateSource>(source: &S, id: &str) -> Option<Coordinate> {
    match source.fetch(id).await {
        Ok(Some(text)) => {
            let parsed = parse_coordinates(&text);
            if parsed.is_none() {
                tracing::warn!("Malformed coordinates for {} at {}", id, source.location(id));
            }
            parsed
        }
        Ok(None) => {
            tracing::warn!("No coordinates found for {}", id);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to load coordinates for {}: {}", id, e);
            None
        }
    }
}

/// Resolved coordinates by entity id. A missing entry is never an error.
#[derive(Debug, Clone, Default)]
pub struct CoordinateCache {
    inner: Arc<RwLock<HashMap<String, Coordinate>>>,
}

impl CoordinateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Coordinate> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
    }

    pub fn insert(&self, id: impl Into<String>, coordinate: Coordinate) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), coordinate);
    }

    pub fn remove(&self, id: &str) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    pub fn snapshot(&self) -> HashMap<String, Coordinate> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn downgrade(&self) -> WeakCoordinateCache {
        WeakCoordinateCache {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Handle held by background loads; once the owner drops the cache, late
/// results go nowhere.
#[derive(Debug, Clone)]
pub struct WeakCoordinateCache {
    inner: Weak<RwLock<HashMap<String, Coordinate>>>,
}

impl WeakCoordinateCache {
    pub fn upgrade(&self) -> Option<CoordinateCache> {
        self.inner.upgrade().map(|inner| CoordinateCache { inner })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateUpdate {
    pub id: String,
    pub coordinates: Option<Coordinate>,
}

pub struct CoordinateLoader<S> {
    source: Arc<S>,
    concurrency: usize,
}

impl<S> Clone for CoordinateLoader<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            concurrency: self.concurrency,
        }
    }
}

impl<S: CoordinateSource + 'static> CoordinateLoader<S> {
    pub fn new(source: S, concurrency: usize) -> Self {
        Self {
            source: Arc::new(source),
            concurrency: concurrency.max(1),
        }
    }

    /// Resolve every id concurrently, writing each result into `cache` as it
    /// lands. Ids that come back empty are cleared from the cache. Returns the
    /// number of ids resolved.
    pub async fn load_all<I>(&self, ids: I, cache: &CoordinateCache) -> usize
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        let mut resolved = 0;
        let mut results = std::pin::pin!(self.results(ids));
        while let Some(update) = results.next().await {
            if apply(cache, &update) {
                resolved += 1;
            }
        }
        tracing::info!("Resolved coordinates for {} entities", resolved);
        resolved
    }

    /// Start loading in the background. Each completion is applied to the
    /// cache and then announced on the returned channel. The task stops
    /// feeding the cache once its owner drops it, and ignores a dropped
    /// receiver.
    pub fn spawn<I>(&self, ids: I, cache: &CoordinateCache) -> mpsc::UnboundedReceiver<CoordinateUpdate>
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let weak = cache.downgrade();
        let loader = self.clone();
        let ids = ids.into_iter();

        tokio::spawn(async move {
            let mut results = std::pin::pin!(loader.results(ids));
            while let Some(update) = results.next().await {
                let Some(cache) = weak.upgrade() else {
                    tracing::debug!("Coordinate cache dropped, discarding remaining results");
                    return;
                };
                apply(&cache, &update);
                let _ = tx.send(update);
            }
        });

        rx
    }

    fn results<I>(&self, ids: I) -> impl futures::Stream<Item = CoordinateUpdate> + Send + 'static
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        let source = self.source.clone();
        futures::stream::iter(ids)
            .map(move |id| {
                let source = source.clone();
                async move {
                    let coordinates = resolve(source.as_ref(), &id).await;
                    CoordinateUpdate { id, coordinates }
                }
            })
            .buffer_unordered(self.concurrency)
    }
}

fn apply(cache: &CoordinateCache, update: &CoordinateUpdate) -> bool {
    match update.coordinates {
        Some(c) => {
            cache.insert(update.id.clone(), c);
            true
        }
        None => {
            cache.remove(&update.id);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lng_pairs() {
        assert_eq!(
            parse_coordinates("43.084579,-77.674778"),
            Some(Coordinate::new(43.084579, -77.674778))
        );
        assert_eq!(
            parse_coordinates("  43.08 , -77.67 \n"),
            Some(Coordinate::new(43.08, -77.67))
        );
    }

    #[test]
    fn rejects_malformed_bodies() {
        assert_eq!(parse_coordinates("abc,def"), None);
        assert_eq!(parse_coordinates(""), None);
        assert_eq!(parse_coordinates("43.0"), None);
        assert_eq!(parse_coordinates("43.0,"), None);
        assert_eq!(parse_coordinates("1,2,3"), None);
        assert_eq!(parse_coordinates("inf,2"), None);
        assert_eq!(parse_coordinates("NaN,2"), None);
    }

    #[test]
    fn http_location_joins_base_and_id() {
        let source = HttpSource::new("https://example.edu/", "/TimeCapsule");
        assert_eq!(
            source.location("Gleason"),
            "https://example.edu/TimeCapsule/images/Gleason/coordinates.txt"
        );
    }

    #[test]
    fn weak_cache_stops_upgrading_after_drop() {
        let cache = CoordinateCache::new();
        let weak = cache.downgrade();
        assert!(weak.upgrade().is_some());
        drop(cache);
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn fs_source_treats_missing_file_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images/A")).unwrap();
        std::fs::write(dir.path().join("images/A/coordinates.txt"), "43.1,-77.6").unwrap();
        let source = FsSource::new(dir.path());

        assert_eq!(resolve(&source, "A").await, Some(Coordinate::new(43.1, -77.6)));
        assert_eq!(resolve(&source, "B").await, None);
    }
}
