use std::ops::Range;

use color_eyre::eyre::{
    Error,
    OptionExt,
};
use nalgebra::Point3;

use crate::voxel::{
    BlockType,
    BlockTypes,
    Rotation,
    world::WorldMeshManager,
};

/// A small hand-built scene that spans several chunks: a layered floor, a
/// tree trunk, a log lying on its side and a glass wall across a chunk
/// border.
#[derive(Clone, Debug)]
pub struct DemoScene {
    pub floor_x: Range<i32>,
    pub floor_z: Range<i32>,

    dirt: BlockType,
    grass: BlockType,
    stone: BlockType,
    glass: BlockType,
    log: BlockType,
}

impl DemoScene {
    /// Height of the grass layer.
    pub const SURFACE: i32 = 2;

    pub fn new(block_types: &BlockTypes) -> Result<Self, Error> {
        let lookup = |name: &str| {
            block_types
                .lookup_name(name)
                .ok_or_eyre(format!("Demo scene needs block type: {name}"))
        };

        Ok(Self {
            floor_x: -12..20,
            floor_z: -12..20,
            dirt: lookup("dirt")?,
            grass: lookup("grass")?,
            stone: lookup("stone")?,
            glass: lookup("glass")?,
            log: lookup("log")?,
        })
    }

    #[profiling::function]
    pub fn build(&self, world: &mut WorldMeshManager) -> Result<(), Error> {
        for x in self.floor_x.clone() {
            for z in self.floor_z.clone() {
                world.edit_block(Point3::new(x, 0, z), Some(self.stone))?;
                world.edit_block(Point3::new(x, 1, z), Some(self.dirt))?;
                world.edit_block(Point3::new(x, Self::SURFACE, z), Some(self.grass))?;
            }
        }

        for y in 3..8 {
            world.edit_block(Point3::new(4, y, 4), Some(self.log))?;
        }

        let lying = Rotation::from_degrees(0, 0, 90).ok_or_eyre("invalid rotation")?;
        for x in 8..12 {
            world.edit_block_rotated(Point3::new(x, 3, 4), self.log, lying)?;
        }

        // x = 15 and x = 16 are in different chunks with the default chunk size
        for x in 15..17 {
            for y in 3..7 {
                for z in 0..4 {
                    world.edit_block(Point3::new(x, y, z), Some(self.glass))?;
                }
            }
        }

        tracing::debug!(num_chunks = world.len(), "built demo scene");

        Ok(())
    }

    /// A block placed on the border between two chunks.
    pub fn boundary_edit(&self, world: &mut WorldMeshManager) -> Result<Point3<i32>, Error> {
        let side_length = i32::from(world.shape().side_length());
        let position = Point3::new(side_length - 1, Self::SURFACE + 1, 10);
        world.edit_block(position, Some(self.stone))?;
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::{
        demo::DemoScene,
        render::texture::{
            ImageTextures,
            resolve_block_textures,
        },
        voxel::{
            BlockFace,
            BlockType,
            BlockTypes,
            block_type::{
                BlockTypeData,
                FaceTextures,
                TextureRef,
            },
            chunk::{
                ChunkPosition,
                ChunkShape,
            },
            world::WorldMeshManager,
        },
    };

    fn block_types() -> BlockTypes {
        let mut block_types = BlockTypes::default();
        for (i, name) in ["stone", "dirt", "grass", "glass", "log"].into_iter().enumerate() {
            let data = BlockTypeData::new(
                name,
                FaceTextures::uniform(TextureRef::new(format!("{name}.png"))),
            )
            .with_opacity(name != "glass");
            block_types.register(BlockType(i as u32), data).unwrap();
        }
        block_types
    }

    fn world() -> (DemoScene, WorldMeshManager) {
        let block_types = block_types();
        let scene = DemoScene::new(&block_types).unwrap();
        let mut world = WorldMeshManager::new(ChunkShape::default(), block_types);
        scene.build(&mut world).unwrap();
        (scene, world)
    }

    #[test]
    fn shipped_assets_support_the_scene() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/blocks.toml");
        let block_types = BlockTypes::load(path).unwrap();
        DemoScene::new(&block_types).unwrap();

        let mut textures = ImageTextures::default();
        let table = resolve_block_textures(&block_types, &mut textures).unwrap();
        assert_eq!(table.len(), 7);

        let air = block_types.lookup_name("air").unwrap();
        assert!(block_types[air].textures.is_none());
    }

    #[test]
    fn missing_block_type_is_reported() {
        let mut block_types = BlockTypes::default();
        block_types
            .register(
                BlockType(0),
                BlockTypeData::new("stone", FaceTextures::uniform(TextureRef::new("stone.png"))),
            )
            .unwrap();

        let error = DemoScene::new(&block_types).unwrap_err();
        assert!(error.to_string().contains("dirt"));
    }

    #[test]
    fn scene_spans_nine_chunks() {
        let (_, mut world) = world();

        let uploaded = world.meshes_needing_upload();
        assert_eq!(uploaded.len(), 9);
        assert_eq!(uploaded, world.chunk_positions());
        assert!(uploaded.iter().all(|position| position.0.y == 0));
    }

    #[test]
    fn grass_is_visible_unless_covered_by_opaque_blocks() {
        let (scene, mut world) = world();

        let mut grass_tops = 0;
        for position in world.chunk_positions() {
            grass_tops += world
                .faces(position)
                .unwrap()
                .iter()
                .filter(|face| face.face == BlockFace::Up && face.position.y == DemoScene::SURFACE)
                .count();
        }

        let floor = scene.floor_x.len() * scene.floor_z.len();
        // trunk and lying log cover grass, glass doesn't
        assert_eq!(grass_tops, floor - 1 - 4);
    }

    #[test]
    fn boundary_edit_reuploads_both_chunks() {
        let (scene, mut world) = world();
        world.meshes_needing_upload();

        let position = scene.boundary_edit(&mut world).unwrap();
        assert_eq!(position, Point3::new(15, 3, 10));
        assert_eq!(
            world.meshes_needing_upload(),
            vec![ChunkPosition::new(0, 0, 0), ChunkPosition::new(1, 0, 0)]
        );
    }
}
