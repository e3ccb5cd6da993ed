//! Archive configuration
//!
//! Resolution order: compiled defaults, then an optional TOML file, then
//! command-line flags and environment variables. A missing config file is
//! not fatal; defaults are used and a warning is logged.

use crate::error::AppError;
use crate::services::scanner;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Directory holding `images/` and `interviews/`.
    pub public_dir: PathBuf,
    /// Deployment base path, e.g. `/TimeCapsule/`.
    pub base_url: String,
    /// Site origin for fetching sidecars over HTTP. When unset, sidecars are
    /// read from `public_dir`.
    pub origin: Option<String>,
    /// Max coordinate fetches in flight.
    pub fetch_concurrency: usize,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public"),
            base_url: "/".to_string(),
            origin: None,
            fetch_concurrency: 8,
            log_level: "info".to_string(),
        }
    }
}

/// Values given on the command line; `None` keeps the file/default value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub public_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub origin: Option<String>,
    pub fetch_concurrency: Option<usize>,
    pub log_level: Option<String>,
}

impl ArchiveConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, AppError> {
        let config: ArchiveConfig =
            toml::from_str(content).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content).map_err(|e| {
                    AppError::Config(format!("{}: {}", path.display(), e))
                })?;
                tracing::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Config file {} not found, using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, AppError> {
        if let Some(dir) = overrides.public_dir {
            self.public_dir = dir;
        }
        if let Some(base) = overrides.base_url {
            self.base_url = base;
        }
        if overrides.origin.is_some() {
            self.origin = overrides.origin;
        }
        if let Some(n) = overrides.fetch_concurrency {
            self.fetch_concurrency = n;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.fetch_concurrency == 0 {
            return Err(AppError::Config(
                "fetch_concurrency must be at least 1".to_string(),
            ));
        }
        if let Err(e) = EnvFilter::try_new(&self.log_level) {
            return Err(AppError::Config(format!(
                "invalid log_level {:?}: {}",
                self.log_level, e
            )));
        }
        if let Some(origin) = &self.origin {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(AppError::Config(format!(
                    "origin must be an http(s) URL, got {}",
                    origin
                )));
            }
        }
        Ok(())
    }

    /// Base path with exactly one trailing `/`.
    pub fn public_base(&self) -> String {
        scanner::public_base(&self.base_url)
    }
}
