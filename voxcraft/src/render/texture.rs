use std::{
    collections::HashMap,
    path::{
        Path,
        PathBuf,
    },
};

use image::RgbaImage;
use nalgebra::Vector2;

use crate::voxel::{
    BlockTypes,
    block_type::TextureRef,
};

const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, thiserror::Error)]
#[error("Invalid texture {}: {reason}", path.display())]
pub struct InvalidTexture {
    pub path: PathBuf,
    #[source]
    pub reason: InvalidTextureReason,
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidTextureReason {
    #[error("File not found")]
    NotFound,

    #[error("Unsupported file extension: {}", .0.as_deref().unwrap_or("none"))]
    UnsupportedExtension(Option<String>),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl InvalidTexture {
    fn new(path: &Path, reason: impl Into<InvalidTextureReason>) -> Self {
        Self {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Checks that `path` is an existing file with a supported image extension.
pub fn validate_texture_path(path: &Path) -> Result<(), InvalidTexture> {
    if !path.is_file() {
        return Err(InvalidTexture::new(path, InvalidTextureReason::NotFound));
    }

    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase());

    match extension {
        Some(extension) if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) => Ok(()),
        extension => {
            Err(InvalidTexture::new(
                path,
                InvalidTextureReason::UnsupportedExtension(extension),
            ))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("texture#{_0}")]
pub struct TextureHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedTexture {
    pub handle: TextureHandle,
    pub size: Vector2<u32>,
}

/// Turns texture files into something the renderer can bind.
pub trait TextureBinding {
    fn resolve(&mut self, path: &Path) -> Result<ResolvedTexture, InvalidTexture>;
}

/// Decodes textures into memory. Each path is only decoded once.
#[derive(derive_more::Debug, Default)]
pub struct ImageTextures {
    resolved: HashMap<PathBuf, ResolvedTexture>,
    #[debug("{} images", self.images.len())]
    images: Vec<RgbaImage>,
}

impl ImageTextures {
    pub fn image(&self, handle: TextureHandle) -> Option<&RgbaImage> {
        self.images.get(usize::try_from(handle.0).ok()?)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl TextureBinding for ImageTextures {
    #[profiling::function]
    fn resolve(&mut self, path: &Path) -> Result<ResolvedTexture, InvalidTexture> {
        if let Some(resolved) = self.resolved.get(path) {
            return Ok(*resolved);
        }

        validate_texture_path(path)?;

        let image = decode_rgba(path).map_err(|error| InvalidTexture::new(path, error))?;
        let resolved = ResolvedTexture {
            handle: TextureHandle(self.images.len() as u32),
            size: Vector2::new(image.width(), image.height()),
        };
        tracing::debug!(path = %path.display(), handle = %resolved.handle, size = ?resolved.size, "loaded texture");

        self.images.push(image);
        self.resolved.insert(path.to_owned(), resolved);

        Ok(resolved)
    }
}

/// Decodes by content rather than by extension, so a mislabeled file still
/// loads if it is a supported image.
fn decode_rgba(path: &Path) -> Result<RgbaImage, image::ImageError> {
    let image = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    Ok(image.into_rgba8())
}

/// Texture handles for every texture a block catalogue references.
#[derive(Clone, Debug, Default)]
pub struct TextureTable {
    textures: HashMap<TextureRef, ResolvedTexture>,
}

impl TextureTable {
    pub fn get(&self, texture: &TextureRef) -> Option<ResolvedTexture> {
        self.textures.get(texture).copied()
    }

    pub fn handle(&self, texture: &TextureRef) -> Option<TextureHandle> {
        self.get(texture).map(|resolved| resolved.handle)
    }

    /// Sorted by texture path.
    pub fn iter(&self) -> impl Iterator<Item = (&TextureRef, &ResolvedTexture)> {
        let mut textures = self.textures.iter().collect::<Vec<_>>();
        textures.sort_by(|a, b| a.0.cmp(b.0));
        textures.into_iter()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Resolves every texture referenced by `block_types`.
///
/// Stops at the first texture that fails to resolve.
pub fn resolve_block_textures<B>(
    block_types: &BlockTypes,
    binding: &mut B,
) -> Result<TextureTable, InvalidTexture>
where
    B: TextureBinding + ?Sized,
{
    let mut table = TextureTable::default();

    for (block_type, data) in block_types.iter() {
        let Some(textures) = &data.textures
        else {
            continue;
        };

        for texture in textures.iter() {
            if table.textures.contains_key(texture) {
                continue;
            }

            let resolved = binding.resolve(texture.path())?;
            tracing::trace!(%block_type, name = %data.name, %texture, handle = %resolved.handle);
            table.textures.insert(texture.clone(), resolved);
        }
    }

    Ok(table)
}
