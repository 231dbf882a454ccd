use std::{
    fs::File,
    io::{
        BufWriter,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
};

use color_eyre::eyre::Error;
use serde::{
    Deserialize,
    Serialize,
};

use crate::voxel::chunk::ChunkShape;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chunk_size: ChunkShape,

    /// Block definitions, relative to the config file.
    #[serde(default = "default_block_types")]
    pub block_types: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: ChunkShape::default(),
            block_types: default_block_types(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let config = if !path.as_ref().exists() {
            let config = Self::default();
            config.save(&path)?;
            config
        }
        else {
            tracing::debug!(path = %path.as_ref().display(), "reading config file");

            let toml = std::fs::read(path)?;
            toml::from_slice::<Self>(&toml)?
        };

        tracing::debug!(?config);

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        tracing::debug!(path = %path.as_ref().display(), "writing config file");

        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(
            "# This file is written by voxcraft when missing. Edit freely.\n\n".as_bytes(),
        )?;

        writer.write_all(toml::to_string_pretty(&self)?.as_bytes())?;
        writer.flush()?;

        Ok(())
    }

    /// Path of the block definitions, resolved against the directory of the
    /// config file at `config_path`.
    pub fn block_types_path(&self, config_path: impl AsRef<Path>) -> PathBuf {
        config_path
            .as_ref()
            .parent()
            .unwrap_or(Path::new(""))
            .join(&self.block_types)
    }
}

fn default_block_types() -> PathBuf {
    "blocks.toml".into()
}
