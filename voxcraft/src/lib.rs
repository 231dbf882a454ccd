pub mod config;
pub mod demo;
pub mod render;
pub mod util;
pub mod voxel;
