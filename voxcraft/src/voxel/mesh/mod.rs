pub mod naive;

use nalgebra::{
    Point2,
    Point3,
    Vector3,
};
use serde::Serialize;

pub use crate::voxel::mesh::naive::naive_mesh;
use crate::voxel::{
    BlockFace,
    BlockType,
    block_type::TextureRef,
};

/// What lies just outside a chunk's box, as far as the caller knows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryOpacity {
    Opaque,
    Transparent,
    Unknown,
}

impl BoundaryOpacity {
    /// Only a confirmed opaque neighbour hides a boundary face.
    #[inline]
    pub fn hides_face(&self) -> bool {
        matches!(self, Self::Opaque)
    }
}

/// Boundary lookup for a chunk that has no known neighbours.
pub fn unknown_boundary(_local: Point3<i32>) -> BoundaryOpacity {
    BoundaryOpacity::Unknown
}

/// A visible face of a block, in world space.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Face {
    /// Cell the face belongs to.
    pub position: Point3<i32>,
    pub face: BlockFace,
    pub block_type: BlockType,
    pub texture: TextureRef,
}

impl Face {
    #[inline]
    pub fn vertices(&self) -> [Point3<i32>; 4] {
        self.face.vertices(self.position)
    }

    #[inline]
    pub fn normal(&self) -> Vector3<i32> {
        self.face.normal()
    }

    #[inline]
    pub fn uvs(&self) -> [Point2<u16>; 4] {
        self.face.uvs()
    }
}
