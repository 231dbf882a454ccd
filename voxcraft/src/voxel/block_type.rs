use std::{
    collections::HashMap,
    ops::Index,
    path::{
        Path,
        PathBuf,
    },
    sync::Arc,
};

use color_eyre::Section;
use indexmap::IndexMap;
use serde::{
    Deserialize,
    Serialize,
    Serializer,
};

use crate::voxel::Error;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
#[display("#{_0}")]
pub struct BlockType(pub u32);

/// Which texture of a block is used for a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceGroup {
    Top,
    Bottom,
    Side,
}

/// Reference to a texture file. Cheap to clone, since every emitted face
/// carries one.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("{}", _0.display())]
pub struct TextureRef(Arc<Path>);

impl TextureRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(Arc::from(path.into()))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Serialize for TextureRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceTextures {
    pub top: TextureRef,
    pub bottom: TextureRef,
    pub side: TextureRef,
}

impl FaceTextures {
    pub fn uniform(texture: TextureRef) -> Self {
        Self {
            top: texture.clone(),
            bottom: texture.clone(),
            side: texture,
        }
    }

    #[inline]
    pub fn get(&self, group: FaceGroup) -> &TextureRef {
        match group {
            FaceGroup::Top => &self.top,
            FaceGroup::Bottom => &self.bottom,
            FaceGroup::Side => &self.side,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextureRef> {
        [&self.top, &self.bottom, &self.side].into_iter()
    }
}

#[derive(Clone, Debug)]
pub struct BlockTypeData {
    pub name: String,

    /// Blocks without textures are not drawn at all.
    pub textures: Option<FaceTextures>,

    /// Opaque blocks hide the faces of their neighbours.
    pub is_opaque: bool,
}

impl BlockTypeData {
    pub fn new(name: impl Into<String>, textures: FaceTextures) -> Self {
        Self {
            name: name.into(),
            textures: Some(textures),
            is_opaque: true,
        }
    }

    pub fn invisible(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            textures: None,
            is_opaque: false,
        }
    }

    pub fn with_opacity(mut self, is_opaque: bool) -> Self {
        self.is_opaque = is_opaque;
        self
    }
}

/// Registry of all block types.
///
/// Clones share the same data. Registering a block type after the registry
/// was cloned leaves the clones untouched.
#[derive(Clone, Debug, Default)]
pub struct BlockTypes {
    inner: Arc<Inner>,
}

#[derive(Clone, Debug, Default)]
struct Inner {
    blocks: IndexMap<BlockType, BlockTypeData>,
    by_name: HashMap<String, BlockType>,
}

impl BlockTypes {
    pub fn register(&mut self, block_type: BlockType, mut data: BlockTypeData) -> Result<(), Error> {
        if self.inner.blocks.contains_key(&block_type) {
            return Err(Error::DuplicateIdentifier(block_type.to_string()));
        }
        if self.inner.by_name.contains_key(&data.name) {
            return Err(Error::DuplicateIdentifier(data.name));
        }

        if data.textures.is_none() && data.is_opaque {
            tracing::warn!("Block without texture defined as opaque: {}", data.name);
            data.is_opaque = false;
        }

        tracing::debug!("block_type: {block_type} => {}", data.name);

        let inner = Arc::make_mut(&mut self.inner);
        inner.by_name.insert(data.name.clone(), block_type);
        inner.blocks.insert(block_type, data);

        Ok(())
    }

    #[inline]
    pub fn lookup(&self, block_type: BlockType) -> Result<&BlockTypeData, Error> {
        self.inner
            .blocks
            .get(&block_type)
            .ok_or(Error::UnknownBlockType(block_type))
    }

    #[inline]
    pub fn lookup_name(&self, name: &str) -> Option<BlockType> {
        self.inner.by_name.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, block_type: BlockType) -> bool {
        self.inner.blocks.contains_key(&block_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockType, &BlockTypeData)> {
        self.inner.blocks.iter().map(|(id, data)| (*id, data))
    }

    pub fn len(&self) -> usize {
        self.inner.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.blocks.is_empty()
    }

    /// Loads block definitions from a TOML file.
    ///
    /// Block types are numbered in file order unless they specify an `id`.
    /// Texture paths are relative to the TOML file.
    #[profiling::function]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, color_eyre::eyre::Error> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "reading block types");

        let toml_directory = path.parent().unwrap_or(Path::new(""));
        let toml = std::fs::read(path).with_note(|| path.display().to_string())?;
        let block_defs: config::BlockDefs =
            toml::from_slice(&toml).with_note(|| path.display().to_string())?;

        let mut block_types = Self::default();

        for (i, (name, block_def)) in block_defs.block_defs.into_iter().enumerate() {
            let block_type = match block_def.id {
                Some(id) => BlockType(id),
                None => BlockType(u32::try_from(i)?),
            };

            let textures = block_def
                .texture
                .map(|texture_def| {
                    let [top, bottom, side] = texture_def
                        .faces()
                        .with_note(|| format!("block type: {name}"))?
                        .map(|path| TextureRef::new(toml_directory.join(path)));
                    Ok::<_, color_eyre::eyre::Error>(FaceTextures { top, bottom, side })
                })
                .transpose()?;

            block_types.register(
                block_type,
                BlockTypeData {
                    name,
                    textures,
                    is_opaque: block_def.is_opaque,
                },
            )?;
        }

        Ok(block_types)
    }
}

impl Index<BlockType> for BlockTypes {
    type Output = BlockTypeData;

    #[inline]
    fn index(&self, index: BlockType) -> &Self::Output {
        &self.inner.blocks[&index]
    }
}

mod config {
    use std::path::{
        Path,
        PathBuf,
    };

    use color_eyre::eyre::{
        Error,
        eyre,
    };
    use indexmap::IndexMap;
    use serde::{
        Deserialize,
        Serialize,
    };

    use crate::util::serde::default_true;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct BlockDefs {
        pub block_defs: IndexMap<String, BlockDef>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct BlockDef {
        pub id: Option<u32>,

        pub texture: Option<TextureDef>,

        #[serde(default = "default_true")]
        pub is_opaque: bool,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum TextureDef {
        Single(PathBuf),
        Groups {
            default: Option<PathBuf>,
            #[serde(alias = "up")]
            top: Option<PathBuf>,
            #[serde(alias = "down")]
            bottom: Option<PathBuf>,
            #[serde(alias = "sides")]
            side: Option<PathBuf>,
        },
    }

    impl TextureDef {
        /// Texture paths for top, bottom and side.
        pub fn faces(&self) -> Result<[&Path; 3], Error> {
            match self {
                TextureDef::Single(path) => Ok([path, path, path].map(PathBuf::as_path)),
                TextureDef::Groups {
                    default,
                    top,
                    bottom,
                    side,
                } => {
                    Ok([
                        group(top, default, "top")?,
                        group(bottom, default, "bottom")?,
                        group(side, default, "side")?,
                    ])
                }
            }
        }
    }

    fn group<'a>(
        path: &'a Option<PathBuf>,
        default: &'a Option<PathBuf>,
        name: &str,
    ) -> Result<&'a Path, Error> {
        path.as_deref()
            .or(default.as_deref())
            .ok_or_else(|| eyre!("Missing texture '{name}' and no default specified"))
    }
}
