pub mod building;
pub mod gallery;
pub mod map;
