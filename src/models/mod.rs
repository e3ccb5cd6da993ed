pub mod archive_types;
pub mod fs_types;
pub mod map_types;
