use std::{fs, io, path::Path};

use bincode::config::{self, Configuration, Fixint};

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("Failed to encode asset: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("Failed to decode asset: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Fixed-width little-endian integers, so counts and vertex ids land on disk
/// as plain u32/u64 words.
const CONFIG: Configuration<config::LittleEndian, Fixint> =
    config::standard().with_fixed_int_encoding();

pub trait Asset: Sized + bincode::Encode + bincode::Decode<()> {
    fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let data = bincode::encode_to_vec(self, CONFIG)?;
        fs::write(path, data)?;
        Ok(())
    }

    fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let data = fs::read(path)?;
        let (asset, _) = bincode::decode_from_slice(&data, CONFIG)?;
        Ok(asset)
    }
}
