pub mod block_face;
pub mod block_type;
pub mod chunk;
pub mod chunk_mesh;
pub mod grid;
pub mod mesh;
pub mod rotation;
pub mod world;

use nalgebra::Point3;

pub use crate::voxel::{
    block_face::BlockFace,
    block_type::{
        BlockType,
        BlockTypes,
    },
    rotation::Rotation,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Position ({}, {}, {}) out of bounds (chunk side length {side_length})",
        .position.x, .position.y, .position.z
    )]
    OutOfBounds {
        position: Point3<i32>,
        side_length: u16,
    },

    #[error("Unknown block type: {0}")]
    UnknownBlockType(BlockType),

    #[error("Duplicate block type identifier: {0}")]
    DuplicateIdentifier(String),
}
