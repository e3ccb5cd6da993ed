use crate::config::ConfigOverrides;
use crate::models::archive_types::{Filter, SortMode};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "time-capsule", version, about = "Campus time capsule archive pipeline")]
pub struct Cli {
    /// TOML config file
    #[arg(long, env = "TIME_CAPSULE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding images/ and interviews/
    #[arg(long, env = "TIME_CAPSULE_PUBLIC_DIR")]
    pub public_dir: Option<PathBuf>,

    /// Deployment base path, e.g. /TimeCapsule/
    #[arg(long, env = "TIME_CAPSULE_BASE_URL")]
    pub base_url: Option<String>,

    /// Fetch coordinate sidecars from this site instead of the local directory
    #[arg(long, env = "TIME_CAPSULE_ORIGIN")]
    pub origin: Option<String>,

    #[arg(long)]
    pub fetch_concurrency: Option<usize>,

    /// Log filter used when RUST_LOG is unset; overrides the config file
    #[arg(long, env = "TIME_CAPSULE_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Gallery cards
    Gallery {
        #[arg(long, value_enum, default_value_t = Filter::All)]
        filter: Filter,
        #[arg(long, value_enum, default_value_t = SortMode::Alphabetical)]
        sort: SortMode,
        /// Fix the shuffle seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Map points for every located building
    Points {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Render the campus map and print the resulting marker scene
    Render {
        #[arg(long)]
        light: bool,
        #[arg(long)]
        no_hover: bool,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the map style document
    Style {
        #[arg(long)]
        light: bool,
    },
    /// One building's page
    Building { id: String },
    /// Home carousel images
    Carousel {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Rebuild whenever the public directory changes
    Watch,
}

impl Command {
    pub fn seed(&self) -> Option<u64> {
        match self {
            Command::Gallery { seed, .. }
            | Command::Points { seed }
            | Command::Render { seed, .. }
            | Command::Carousel { seed } => *seed,
            _ => None,
        }
    }
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            public_dir: self.public_dir.clone(),
            base_url: self.base_url.clone(),
            origin: self.origin.clone(),
            fetch_concurrency: self.fetch_concurrency,
            log_level: self.log_level.clone(),
        }
    }
}
