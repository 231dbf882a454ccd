use std::{
    collections::HashMap,
    sync::Arc,
};

use nalgebra::Point3;

use crate::voxel::{
    BlockType,
    BlockTypes,
    Error,
    Rotation,
    chunk::{
        ChunkPosition,
        ChunkShape,
    },
    chunk_mesh::ChunkMesh,
    grid::VoxelGrid,
    mesh::{
        BoundaryOpacity,
        Face,
    },
};

/// All loaded chunks of a world, with their meshes.
///
/// Edits go through [`edit_block`](Self::edit_block), which keeps track of
/// which chunk meshes are stale, including neighbouring chunks whose
/// boundary faces might change.
#[derive(derive_more::Debug)]
pub struct WorldMeshManager {
    shape: ChunkShape,
    #[debug(skip)]
    block_types: BlockTypes,
    #[debug("{} chunks", self.chunks.len())]
    chunks: HashMap<ChunkPosition, ChunkMesh>,
}

impl WorldMeshManager {
    pub fn new(shape: ChunkShape, block_types: BlockTypes) -> Self {
        Self {
            shape,
            block_types,
            chunks: HashMap::new(),
        }
    }

    #[inline]
    pub fn shape(&self) -> ChunkShape {
        self.shape
    }

    #[inline]
    pub fn block_types(&self) -> &BlockTypes {
        &self.block_types
    }

    /// Places (`Some`) or removes (`None`) a block at a world position.
    ///
    /// Positions in chunks outside [`ChunkShape::chunk_bounds`] are rejected
    /// with [`Error::OutOfBounds`].
    pub fn edit_block(
        &mut self,
        position: Point3<i32>,
        block_type: Option<BlockType>,
    ) -> Result<(), Error> {
        match block_type {
            Some(block_type) => self.edit_block_rotated(position, block_type, Rotation::IDENTITY),
            None => {
                self.check_world_bounds(position)?;
                let (chunk_position, local) = self.shape.split(position);
                let changed = self.chunk_mut_or_create(chunk_position).clear_block(local);
                if changed {
                    self.mark_boundary_neighbors_dirty(chunk_position, local);
                }
                Ok(())
            }
        }
    }

    pub fn edit_block_rotated(
        &mut self,
        position: Point3<i32>,
        block_type: BlockType,
        rotation: Rotation,
    ) -> Result<(), Error> {
        // validate before creating the chunk, so a failed edit leaves no trace
        self.check_world_bounds(position)?;
        self.block_types.lookup(block_type)?;

        let (chunk_position, local) = self.shape.split(position);
        let changed = self
            .chunk_mut_or_create(chunk_position)
            .set_block_rotated(local, block_type, rotation)?;
        if changed {
            self.mark_boundary_neighbors_dirty(chunk_position, local);
        }

        Ok(())
    }

    pub fn get_block(&self, position: Point3<i32>) -> Option<BlockType> {
        let (chunk_position, local) = self.shape.split(position);
        self.chunks.get(&chunk_position)?.grid().get(local)
    }

    /// Rebuilds all dirty chunk meshes and returns their positions, sorted.
    ///
    /// These are the chunks whose GPU buffers need to be re-uploaded.
    #[profiling::function]
    pub fn meshes_needing_upload(&mut self) -> Vec<ChunkPosition> {
        let mut dirty = self
            .chunks
            .iter()
            .filter(|(_, chunk)| chunk.is_dirty())
            .map(|(position, _)| *position)
            .collect::<Vec<_>>();
        dirty.sort();

        for position in &dirty {
            self.rebuild(*position);
        }

        if !dirty.is_empty() {
            tracing::debug!(num_chunks = dirty.len(), "rebuilt chunk meshes");
        }

        dirty
    }

    /// Up-to-date faces of a loaded chunk.
    pub fn faces(&mut self, position: ChunkPosition) -> Option<Arc<[Face]>> {
        self.rebuild(position)
    }

    pub fn chunk(&self, position: ChunkPosition) -> Option<&ChunkMesh> {
        self.chunks.get(&position)
    }

    pub fn chunk_positions(&self) -> Vec<ChunkPosition> {
        let mut positions = self.chunks.keys().copied().collect::<Vec<_>>();
        positions.sort();
        positions
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Removes a chunk and returns its voxels.
    ///
    /// Loaded neighbours are marked dirty, since faces that were hidden by
    /// this chunk are now on an unknown boundary.
    pub fn unload(&mut self, position: ChunkPosition) -> Option<VoxelGrid> {
        let chunk = self.chunks.remove(&position)?;
        tracing::debug!(position = ?position.0, "unloaded chunk");

        for (_, neighbor) in position.neighbors() {
            if let Some(neighbor) = self.chunks.get_mut(&neighbor) {
                neighbor.mark_dirty();
            }
        }

        Some(chunk.into_grid())
    }

    /// What the neighbouring chunk holds at a position just outside the box
    /// of the chunk at `position`.
    pub fn boundary_opacity(&self, position: ChunkPosition, local: Point3<i32>) -> BoundaryOpacity {
        let world: [Option<i32>; 3] = self
            .shape
            .origin(position)
            .coords
            .zip_map(&local.coords, |origin, local| origin.checked_add(local))
            .into();

        // no chunk can exist past the ends of the coordinate range
        let [Some(x), Some(y), Some(z)] = world
        else {
            return BoundaryOpacity::Unknown;
        };
        let (neighbor_position, neighbor_local) = self.shape.split(Point3::new(x, y, z));

        match self.chunks.get(&neighbor_position) {
            None => BoundaryOpacity::Unknown,
            Some(neighbor) if neighbor.grid().is_opaque(neighbor_local) => BoundaryOpacity::Opaque,
            Some(_) => BoundaryOpacity::Transparent,
        }
    }

    fn check_world_bounds(&self, position: Point3<i32>) -> Result<(), Error> {
        if self.shape.contains_world(position) {
            Ok(())
        }
        else {
            Err(Error::OutOfBounds {
                position,
                side_length: self.shape.side_length(),
            })
        }
    }

    fn rebuild(&mut self, position: ChunkPosition) -> Option<Arc<[Face]>> {
        // take the chunk out of the map, so the boundary lookup can borrow the
        // remaining chunks while this one is being meshed.
        let mut chunk = self.chunks.remove(&position)?;
        let faces = chunk.faces(|local| self.boundary_opacity(position, local));
        self.chunks.insert(position, chunk);
        Some(faces)
    }

    fn chunk_mut_or_create(&mut self, position: ChunkPosition) -> &mut ChunkMesh {
        let shape = self.shape;
        let block_types = &self.block_types;

        self.chunks.entry(position).or_insert_with(|| {
            tracing::debug!(position = ?position.0, "created chunk");
            let grid = VoxelGrid::with_origin(shape, shape.origin(position), block_types.clone());
            ChunkMesh::new(position, grid)
        })
    }

    fn mark_boundary_neighbors_dirty(&mut self, position: ChunkPosition, local: Point3<i32>) {
        let Some(chunk) = self.chunks.get(&position)
        else {
            return;
        };

        let outside = chunk
            .grid()
            .neighbors(local)
            .into_iter()
            .filter(|neighbor| !neighbor.inside)
            .map(|neighbor| position.neighbor(neighbor.face))
            .collect::<Vec<_>>();

        for neighbor in outside {
            if let Some(neighbor) = self.chunks.get_mut(&neighbor) {
                tracing::trace!(position = ?neighbor.position().0, "boundary edit invalidates neighbour");
                neighbor.mark_dirty();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nalgebra::Point3;

    use crate::voxel::{
        BlockFace,
        BlockType,
        BlockTypes,
        Error,
        block_type::{
            BlockTypeData,
            FaceTextures,
            TextureRef,
        },
        chunk::{
            ChunkPosition,
            ChunkShape,
        },
        mesh::BoundaryOpacity,
        world::WorldMeshManager,
    };

    const STONE: BlockType = BlockType(1);
    const GLASS: BlockType = BlockType(2);

    fn world() -> WorldMeshManager {
        let mut block_types = BlockTypes::default();
        block_types
            .register(
                STONE,
                BlockTypeData::new("stone", FaceTextures::uniform(TextureRef::new("stone.png"))),
            )
            .unwrap();
        block_types
            .register(
                GLASS,
                BlockTypeData::new("glass", FaceTextures::uniform(TextureRef::new("glass.png")))
                    .with_opacity(false),
            )
            .unwrap();
        WorldMeshManager::new(ChunkShape::new(4), block_types)
    }

    fn is_dirty(world: &WorldMeshManager, position: ChunkPosition) -> bool {
        world.chunk(position).unwrap().is_dirty()
    }

    #[test]
    fn edit_creates_chunk_lazily() {
        let mut world = world();
        assert!(world.is_empty());

        world.edit_block(Point3::new(5, -1, 0), Some(STONE)).unwrap();

        assert_eq!(world.chunk_positions(), vec![ChunkPosition::new(1, -1, 0)]);
        assert_eq!(world.get_block(Point3::new(5, -1, 0)), Some(STONE));
        assert_eq!(world.get_block(Point3::new(5, -2, 0)), None);
        assert_eq!(
            world
                .chunk(ChunkPosition::new(1, -1, 0))
                .unwrap()
                .grid()
                .get(Point3::new(1, 3, 0)),
            Some(STONE)
        );
    }

    #[test]
    fn failed_edit_does_not_create_chunk() {
        let mut world = world();
        assert!(matches!(
            world.edit_block(Point3::new(0, 0, 0), Some(BlockType(77))),
            Err(Error::UnknownBlockType(_))
        ));
        assert!(world.is_empty());
    }

    #[test]
    fn meshes_needing_upload_reports_and_cleans_dirty_chunks() {
        let mut world = world();
        world.edit_block(Point3::new(1, 1, 1), Some(STONE)).unwrap();
        world.edit_block(Point3::new(9, 1, 1), Some(STONE)).unwrap();

        assert_eq!(
            world.meshes_needing_upload(),
            vec![ChunkPosition::new(0, 0, 0), ChunkPosition::new(2, 0, 0)]
        );
        assert!(!is_dirty(&world, ChunkPosition::new(0, 0, 0)));
        assert!(!is_dirty(&world, ChunkPosition::new(2, 0, 0)));
        assert!(world.meshes_needing_upload().is_empty());
    }

    #[test]
    fn interior_edit_only_dirties_owning_chunk() {
        let mut world = world();
        world.edit_block(Point3::new(1, 1, 1), Some(STONE)).unwrap();
        world.edit_block(Point3::new(5, 1, 1), Some(STONE)).unwrap();
        world.meshes_needing_upload();

        world.edit_block(Point3::new(2, 2, 2), Some(STONE)).unwrap();

        assert!(is_dirty(&world, ChunkPosition::new(0, 0, 0)));
        assert!(!is_dirty(&world, ChunkPosition::new(1, 0, 0)));
        assert_eq!(world.meshes_needing_upload(), vec![ChunkPosition::new(0, 0, 0)]);
    }

    #[test]
    fn boundary_edit_dirties_the_neighbor_sharing_that_face() {
        let mut world = world();
        for chunk in [
            ChunkPosition::new(0, 0, 0),
            ChunkPosition::new(1, 0, 0),
            ChunkPosition::new(-1, 0, 0),
            ChunkPosition::new(0, 1, 0),
        ] {
            let origin = world.shape().origin(chunk);
            world
                .edit_block(origin + nalgebra::Vector3::new(1, 1, 1), Some(STONE))
                .unwrap();
        }
        world.meshes_needing_upload();

        // on the +X face of chunk (0, 0, 0)
        world.edit_block(Point3::new(3, 1, 1), Some(STONE)).unwrap();

        assert_eq!(
            world.meshes_needing_upload(),
            vec![ChunkPosition::new(0, 0, 0), ChunkPosition::new(1, 0, 0)]
        );

        // corner on the +X and +Y faces
        let corner = vec![
            ChunkPosition::new(0, 0, 0),
            ChunkPosition::new(0, 1, 0),
            ChunkPosition::new(1, 0, 0),
        ];
        world.edit_block(Point3::new(3, 3, 1), Some(STONE)).unwrap();
        assert_eq!(world.meshes_needing_upload(), corner);

        world.edit_block(Point3::new(3, 3, 1), None).unwrap();
        assert_eq!(world.meshes_needing_upload(), corner);

        // -X face, the neighbour there is loaded too
        world.edit_block(Point3::new(0, 2, 2), Some(STONE)).unwrap();
        assert_eq!(
            world.meshes_needing_upload(),
            vec![ChunkPosition::new(-1, 0, 0), ChunkPosition::new(0, 0, 0)]
        );
    }

    #[test]
    fn faces_across_loaded_chunk_boundary_are_culled() {
        let mut world = world();
        world.edit_block(Point3::new(3, 0, 0), Some(STONE)).unwrap();
        world.edit_block(Point3::new(4, 0, 0), Some(STONE)).unwrap();
        world.meshes_needing_upload();

        let left = world.faces(ChunkPosition::new(0, 0, 0)).unwrap();
        let right = world.faces(ChunkPosition::new(1, 0, 0)).unwrap();

        assert_eq!(left.len(), 5);
        assert_eq!(right.len(), 5);
        assert!(!left.iter().any(|face| face.face == BlockFace::Right));
        assert!(!right.iter().any(|face| face.face == BlockFace::Left));
    }

    #[test]
    fn transparent_neighbor_across_boundary_keeps_face() {
        let mut world = world();
        world.edit_block(Point3::new(3, 0, 0), Some(STONE)).unwrap();
        world.edit_block(Point3::new(4, 0, 0), Some(GLASS)).unwrap();

        assert_eq!(
            world.boundary_opacity(ChunkPosition::new(0, 0, 0), Point3::new(4, 0, 0)),
            BoundaryOpacity::Transparent
        );
        assert_eq!(world.faces(ChunkPosition::new(0, 0, 0)).unwrap().len(), 6);
        assert_eq!(world.faces(ChunkPosition::new(1, 0, 0)).unwrap().len(), 5);
    }

    #[test]
    fn missing_neighbor_chunk_always_emits_boundary_faces() {
        let mut world = world();
        // fill the whole +X boundary layer of the chunk
        for y in 0..4 {
            for z in 0..4 {
                world.edit_block(Point3::new(3, y, z), Some(STONE)).unwrap();
            }
        }

        assert_eq!(
            world.boundary_opacity(ChunkPosition::new(0, 0, 0), Point3::new(4, 0, 0)),
            BoundaryOpacity::Unknown
        );

        let faces = world.faces(ChunkPosition::new(0, 0, 0)).unwrap();
        let boundary_faces = faces
            .iter()
            .filter(|face| face.face == BlockFace::Right)
            .count();
        assert_eq!(boundary_faces, 16);
    }

    #[test]
    fn unload_releases_grid_and_reexposes_neighbor_faces() {
        let mut world = world();
        world.edit_block(Point3::new(3, 0, 0), Some(STONE)).unwrap();
        world.edit_block(Point3::new(4, 0, 0), Some(STONE)).unwrap();
        world.meshes_needing_upload();
        assert_eq!(world.faces(ChunkPosition::new(0, 0, 0)).unwrap().len(), 5);

        let grid = world.unload(ChunkPosition::new(1, 0, 0)).unwrap();
        assert_eq!(grid.get(Point3::new(0, 0, 0)), Some(STONE));
        assert!(world.chunk(ChunkPosition::new(1, 0, 0)).is_none());
        assert_eq!(world.get_block(Point3::new(4, 0, 0)), None);

        assert_eq!(world.meshes_needing_upload(), vec![ChunkPosition::new(0, 0, 0)]);
        assert_eq!(world.faces(ChunkPosition::new(0, 0, 0)).unwrap().len(), 6);

        assert!(world.unload(ChunkPosition::new(1, 0, 0)).is_none());

        // touching the chunk again starts from an empty grid
        world.edit_block(Point3::new(5, 0, 0), None).unwrap();
        assert!(world.chunk(ChunkPosition::new(1, 0, 0)).unwrap().grid().is_empty());
    }

    #[test]
    fn edits_at_the_ends_of_the_i32_range_are_rejected() {
        for side_length in [16, 3] {
            let mut world = WorldMeshManager::new(ChunkShape::new(side_length), world().block_types().clone());

            for position in [
                Point3::new(i32::MIN, 0, 0),
                Point3::new(0, i32::MAX, 0),
                Point3::new(0, 0, i32::MIN),
            ] {
                assert!(matches!(
                    world.edit_block(position, Some(STONE)),
                    Err(Error::OutOfBounds { .. })
                ));
                assert!(matches!(
                    world.edit_block(position, None),
                    Err(Error::OutOfBounds { .. })
                ));
            }

            assert!(world.is_empty());
            assert!(world.meshes_needing_upload().is_empty());
        }
    }

    #[test]
    fn outermost_chunks_mesh_without_overflow() {
        let mut world = WorldMeshManager::new(ChunkShape::new(3), world().block_types().clone());
        let bounds = world.shape().chunk_bounds();
        let low = *bounds.start() * 3;
        let high = (*bounds.end() + 1) * 3 - 1;

        world.edit_block(Point3::new(low, low, low), Some(STONE)).unwrap();
        world.edit_block(Point3::new(high, high, high), Some(STONE)).unwrap();

        assert_eq!(world.meshes_needing_upload().len(), 2);
        for position in world.chunk_positions() {
            let faces = world.faces(position).unwrap();
            assert_eq!(faces.len(), 6);
            for face in faces.iter() {
                face.vertices();
            }
        }

        assert_eq!(
            world.boundary_opacity(ChunkPosition::new(i32::MIN, 0, 0), Point3::new(-1, 0, 0)),
            BoundaryOpacity::Unknown
        );
    }

    #[test]
    fn faces_are_cached_between_frames() {
        let mut world = world();
        world.edit_block(Point3::new(0, 0, 0), Some(STONE)).unwrap();

        let first = world.faces(ChunkPosition::new(0, 0, 0)).unwrap();
        assert!(world.meshes_needing_upload().is_empty());
        let second = world.faces(ChunkPosition::new(0, 0, 0)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(world.faces(ChunkPosition::new(9, 9, 9)).is_none());
    }
}
