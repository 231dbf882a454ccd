use std::{
    fs::File,
    io::BufWriter,
    path::{
        Path,
        PathBuf,
    },
};

use clap::{
    Parser,
    Subcommand,
};
use color_eyre::eyre::Error;
use serde::Serialize;
use voxcraft::{
    config::Config,
    demo::DemoScene,
    render::{
        mesh::MeshBuilder,
        texture::{
            ImageTextures,
            resolve_block_textures,
        },
    },
    voxel::{
        BlockTypes,
        chunk::ChunkPosition,
        mesh::Face,
        world::WorldMeshManager,
    },
};

#[derive(Debug, Parser)]
pub struct Args {
    /// Config file. Created with defaults if it doesn't exist.
    #[clap(short, long, default_value = "assets/voxcraft.toml")]
    config: PathBuf,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand, Default)]
enum Command {
    /// Mesh the demo scene and show what would be uploaded.
    #[default]
    Mesh,

    /// Resolve every texture of the block catalogue.
    Textures,

    /// Write the faces of the demo scene as JSON.
    Dump {
        #[clap(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = Config::load(&args.config)?;
    let block_types = BlockTypes::load(config.block_types_path(&args.config))?;

    match args.command.unwrap_or_default() {
        Command::Mesh => mesh(&config, block_types)?,
        Command::Textures => textures(&block_types)?,
        Command::Dump { output } => dump(&config, block_types, &output)?,
    }

    Ok(())
}

fn demo_world(config: &Config, block_types: BlockTypes) -> Result<(DemoScene, WorldMeshManager), Error> {
    let scene = DemoScene::new(&block_types)?;
    let mut world = WorldMeshManager::new(config.chunk_size, block_types);
    scene.build(&mut world)?;
    Ok((scene, world))
}

fn mesh(config: &Config, block_types: BlockTypes) -> Result<(), Error> {
    let mut textures = ImageTextures::default();
    let texture_table = resolve_block_textures(&block_types, &mut textures)?;

    let (scene, mut world) = demo_world(config, block_types)?;

    let mut mesh_builder = MeshBuilder::default();
    let mut upload = |world: &mut WorldMeshManager| {
        for position in world.meshes_needing_upload() {
            let Some(faces) = world.faces(position)
            else {
                continue;
            };

            mesh_builder.clear();
            mesh_builder.push_faces(faces.iter(), &texture_table);

            let (num_vertices, num_indices) = mesh_builder
                .finish()
                .map_or((0, 0), |mesh| (mesh.vertices.len(), mesh.num_indices()));

            println!(
                "chunk ({:>3}, {:>3}, {:>3}): {:>5} faces, {:>5} vertices, {:>5} indices",
                position.0.x,
                position.0.y,
                position.0.z,
                faces.len(),
                num_vertices,
                num_indices
            );
        }
    };

    println!("initial upload:");
    upload(&mut world);

    let position = scene.boundary_edit(&mut world)?;
    println!(
        "after placing a block at ({}, {}, {}):",
        position.x, position.y, position.z
    );
    upload(&mut world);

    Ok(())
}

fn textures(block_types: &BlockTypes) -> Result<(), Error> {
    let mut textures = ImageTextures::default();
    let table = resolve_block_textures(block_types, &mut textures)?;

    for (texture, resolved) in table.iter() {
        println!(
            "{}: {}x{} {texture}",
            resolved.handle, resolved.size.x, resolved.size.y
        );
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct ChunkFaces<'a> {
    position: ChunkPosition,
    faces: &'a [Face],
}

fn dump(config: &Config, block_types: BlockTypes, output: &Path) -> Result<(), Error> {
    let (_, mut world) = demo_world(config, block_types)?;

    let positions = world.meshes_needing_upload();
    let meshes = positions
        .into_iter()
        .filter_map(|position| Some((position, world.faces(position)?)))
        .collect::<Vec<_>>();

    let chunks = meshes
        .iter()
        .map(|(position, faces)| {
            ChunkFaces {
                position: *position,
                faces,
            }
        })
        .collect::<Vec<_>>();

    let writer = BufWriter::new(File::create(output)?);
    serde_json::to_writer_pretty(writer, &chunks)?;

    tracing::info!(path = %output.display(), num_chunks = chunks.len(), "wrote faces");

    Ok(())
}
