use std::{
    sync::Arc,
    time::Instant,
};

use nalgebra::Point3;

use crate::voxel::{
    BlockType,
    Error,
    Rotation,
    chunk::ChunkPosition,
    grid::VoxelGrid,
    mesh::{
        BoundaryOpacity,
        Face,
        naive_mesh,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshState {
    Clean,
    Dirty,
}

/// A chunk's voxels together with their cached faces.
///
/// The cache is rebuilt lazily: edits only mark the mesh dirty and the next
/// call to [`faces`](Self::faces) re-meshes the whole chunk.
#[derive(Clone, derive_more::Debug)]
pub struct ChunkMesh {
    position: ChunkPosition,
    grid: VoxelGrid,
    #[debug("{} faces", self.faces.len())]
    faces: Arc<[Face]>,
    state: MeshState,
}

impl ChunkMesh {
    pub fn new(position: ChunkPosition, grid: VoxelGrid) -> Self {
        Self {
            position,
            grid,
            faces: Arc::from(Vec::new()),
            state: MeshState::Dirty,
        }
    }

    #[inline]
    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    #[inline]
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    #[inline]
    pub fn state(&self) -> MeshState {
        self.state
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.state == MeshState::Dirty
    }

    pub fn mark_dirty(&mut self) {
        self.state = MeshState::Dirty;
    }

    /// The cached faces, possibly stale.
    pub fn cached_faces(&self) -> &Arc<[Face]> {
        &self.faces
    }

    /// Up-to-date faces of this chunk, rebuilding them if the chunk is dirty.
    ///
    /// While clean, the same shared slice is returned on every call.
    pub fn faces<B>(&mut self, boundary: B) -> Arc<[Face]>
    where
        B: Fn(Point3<i32>) -> BoundaryOpacity,
    {
        if self.is_dirty() {
            let t_start = Instant::now();
            let faces = naive_mesh(&self.grid, boundary);
            let time = t_start.elapsed();
            tracing::trace!(position = ?self.position.0, num_faces = faces.len(), ?time, "meshed chunk");

            self.faces = faces.into();
            self.state = MeshState::Clean;
        }

        self.faces.clone()
    }

    pub fn set_block(&mut self, position: Point3<i32>, block_type: BlockType) -> Result<bool, Error> {
        self.set_block_rotated(position, block_type, Rotation::IDENTITY)
    }

    pub fn set_block_rotated(
        &mut self,
        position: Point3<i32>,
        block_type: BlockType,
        rotation: Rotation,
    ) -> Result<bool, Error> {
        let changed = self.grid.set_rotated(position, block_type, rotation)?;
        if changed {
            self.mark_dirty();
        }
        Ok(changed)
    }

    pub fn clear_block(&mut self, position: Point3<i32>) -> bool {
        let changed = self.grid.clear(position);
        if changed {
            self.mark_dirty();
        }
        changed
    }

    pub fn into_grid(self) -> VoxelGrid {
        self.grid
    }
}
