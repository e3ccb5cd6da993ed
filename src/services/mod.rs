pub mod aggregator;
pub mod coordinates;
pub mod fs_service;
pub mod manifest;
pub mod map_style;
pub mod markers;
pub mod scanner;
pub mod watcher;
