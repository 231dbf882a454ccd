use std::{
    cmp::Ordering,
    num::NonZero,
    ops::RangeInclusive,
};

use nalgebra::{
    Point3,
    Vector3,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::voxel::BlockFace;

/// Size of the cubic box covered by one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkShape {
    side_length: NonZero<u16>,
}

impl ChunkShape {
    pub const DEFAULT_SIDE_LENGTH: NonZero<u16> = const { NonZero::new(16).unwrap() };

    /// # Panics
    ///
    /// Panics if `side_length` is zero.
    pub fn new(side_length: u16) -> Self {
        let side_length = NonZero::new(side_length).expect("chunk side length must not be zero");
        Self { side_length }
    }

    pub const fn from_side_length(side_length: NonZero<u16>) -> Self {
        Self { side_length }
    }

    #[inline]
    pub fn side_length(&self) -> u16 {
        self.side_length.get()
    }

    pub fn num_voxels(&self) -> usize {
        usize::from(self.side_length()).pow(3)
    }

    #[inline]
    pub fn contains(&self, local: Point3<i32>) -> bool {
        let side_length = i32::from(self.side_length());
        local.iter().all(|c| (0..side_length).contains(c))
    }

    /// Chunk coordinates whose whole box, including the far corners of its
    /// faces and the cells just outside, can be addressed with `i32`.
    pub fn chunk_bounds(&self) -> RangeInclusive<i32> {
        let n = i32::MAX / i32::from(self.side_length());
        -n..=(n - 1)
    }

    /// Whether `world` lies in a chunk within [`chunk_bounds`](Self::chunk_bounds).
    pub fn contains_world(&self, world: Point3<i32>) -> bool {
        let bounds = self.chunk_bounds();
        let (chunk, _) = self.split(world);
        chunk.0.iter().all(|c| bounds.contains(c))
    }

    /// World position of the chunk's local origin.
    ///
    /// Saturates for chunks outside [`chunk_bounds`](Self::chunk_bounds).
    pub fn origin(&self, chunk: ChunkPosition) -> Point3<i32> {
        let side_length = i32::from(self.side_length());
        chunk.0.map(|c| c.saturating_mul(side_length))
    }

    /// Splits a world position into the chunk containing it and the position
    /// inside that chunk.
    pub fn split(&self, world: Point3<i32>) -> (ChunkPosition, Point3<i32>) {
        let side_length = i32::from(self.side_length());
        let chunk = world.map(|c| c.div_euclid(side_length));
        let local = world.map(|c| c.rem_euclid(side_length));
        (ChunkPosition(chunk), local)
    }
}

impl Default for ChunkShape {
    fn default() -> Self {
        Self::from_side_length(Self::DEFAULT_SIDE_LENGTH)
    }
}

/// Position of a chunk in chunk units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkPosition(pub Point3<i32>);

impl ChunkPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Point3::new(x, y, z))
    }

    pub fn neighbor(&self, face: BlockFace) -> Self {
        Self(self.0 + face.normal())
    }

    pub fn neighbors(&self) -> [(BlockFace, Self); 6] {
        BlockFace::ALL.map(|face| (face, self.neighbor(face)))
    }

    fn key(&self) -> [i32; 3] {
        self.0.coords.into()
    }
}

impl From<Vector3<i32>> for ChunkPosition {
    fn from(value: Vector3<i32>) -> Self {
        Self(value.into())
    }
}

impl PartialOrd for ChunkPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChunkPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}
