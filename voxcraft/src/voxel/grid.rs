use std::collections::BTreeMap;

use nalgebra::Point3;
use serde::{
    Deserialize,
    Serialize,
};

use crate::voxel::{
    BlockFace,
    BlockType,
    BlockTypes,
    Error,
    Rotation,
    chunk::ChunkShape,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub block_type: BlockType,
    pub rotation: Rotation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbor {
    pub face: BlockFace,
    pub position: Point3<i32>,
    pub inside: bool,
}

/// Sparse voxel storage for one chunk.
///
/// Only occupied cells are stored. Cells are kept sorted by their local
/// position (x, then y, then z).
#[derive(Clone, derive_more::Debug)]
pub struct VoxelGrid {
    shape: ChunkShape,
    origin: Point3<i32>,
    #[debug(skip)]
    block_types: BlockTypes,
    #[debug(skip)]
    cells: BTreeMap<[u16; 3], Cell>,
}

impl VoxelGrid {
    pub fn new(shape: ChunkShape, block_types: BlockTypes) -> Self {
        Self::with_origin(shape, Point3::origin(), block_types)
    }

    /// Grid whose local position `(0, 0, 0)` is at `origin` in the world.
    pub fn with_origin(shape: ChunkShape, origin: Point3<i32>, block_types: BlockTypes) -> Self {
        Self {
            shape,
            origin,
            block_types,
            cells: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn shape(&self) -> ChunkShape {
        self.shape
    }

    #[inline]
    pub fn origin(&self) -> Point3<i32> {
        self.origin
    }

    #[inline]
    pub fn block_types(&self) -> &BlockTypes {
        &self.block_types
    }

    /// Places a block with default rotation.
    ///
    /// Returns whether the change can affect faces, which is always the case.
    pub fn set(&mut self, position: Point3<i32>, block_type: BlockType) -> Result<bool, Error> {
        self.set_rotated(position, block_type, Rotation::IDENTITY)
    }

    pub fn set_rotated(
        &mut self,
        position: Point3<i32>,
        block_type: BlockType,
        rotation: Rotation,
    ) -> Result<bool, Error> {
        let key = self.key(position).ok_or(Error::OutOfBounds {
            position,
            side_length: self.shape.side_length(),
        })?;

        if !self.block_types.contains(block_type) {
            return Err(Error::UnknownBlockType(block_type));
        }

        self.cells.insert(
            key,
            Cell {
                block_type,
                rotation,
            },
        );

        Ok(true)
    }

    /// Removes the block at `position`, if there is one.
    ///
    /// Like [`set`](Self::set), this reports a change that can affect faces.
    pub fn clear(&mut self, position: Point3<i32>) -> bool {
        if let Some(key) = self.key(position) {
            self.cells.remove(&key);
        }
        true
    }

    #[inline]
    pub fn get(&self, position: Point3<i32>) -> Option<BlockType> {
        self.cell(position).map(|cell| cell.block_type)
    }

    #[inline]
    pub fn cell(&self, position: Point3<i32>) -> Option<&Cell> {
        self.cells.get(&self.key(position)?)
    }

    /// Whether `position` holds an opaque block. Empty and out-of-bounds
    /// positions are not opaque.
    #[inline]
    pub fn is_opaque(&self, position: Point3<i32>) -> bool {
        self.get(position)
            .is_some_and(|block_type| self.block_types[block_type].is_opaque)
    }

    /// The six adjacent positions, in [`BlockFace::ALL`] order.
    pub fn neighbors(&self, position: Point3<i32>) -> [Neighbor; 6] {
        BlockFace::ALL.map(|face| {
            let position = position + face.normal();
            Neighbor {
                face,
                position,
                inside: self.shape.contains(position),
            }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Point3<i32>, &Cell)> {
        self.cells
            .iter()
            .map(|(&key, cell)| (key.map(i32::from).into(), cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn key(&self, position: Point3<i32>) -> Option<[u16; 3]> {
        self.shape
            .contains(position)
            .then(|| position.coords.map(|c| c as u16).into())
    }
}
