//! Loading of finished sequences handed over by sequence construction tools.
//!
//! A sequence is exchanged as MessagePack, optionally wrapped in a zstd frame.

use std::path::Path;

use crate::{BlockSeq, error::LoadError};

const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

pub fn load_seq(path: impl AsRef<Path>) -> Result<BlockSeq, LoadError> {
    let raw = std::fs::read(path)?;
    decode_seq(&raw)
}

/// Decode a MessagePack encoded sequence, decompressing it first if it is a zstd frame.
pub fn decode_seq(raw: &[u8]) -> Result<BlockSeq, LoadError> {
    if raw.starts_with(&ZSTD_MAGIC) {
        let decompressed = decompress(raw)?;
        rmp_serde::from_slice(&decompressed).map_err(LoadError::DeserializationError)
    } else {
        rmp_serde::from_slice(raw).map_err(LoadError::DeserializationError)
    }
}

pub fn encode_seq(seq: &BlockSeq, compressed: bool) -> Result<Vec<u8>, LoadError> {
    let raw = rmp_serde::to_vec(seq).map_err(LoadError::SerializationError)?;
    if compressed {
        Ok(compress(&raw))
    } else {
        Ok(raw)
    }
}

fn decompress(raw: &[u8]) -> Result<Vec<u8>, LoadError> {
    use ruzstd::io::Read;
    let mut decoder = ruzstd::decoding::StreamingDecoder::new(raw)
        .map_err(|e| LoadError::DecompressionError(std::io::Error::other(e)))?;
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(LoadError::DecompressionError)?;
    Ok(decompressed)
}

fn compress(raw: &[u8]) -> Vec<u8> {
    ruzstd::encoding::compress_to_vec(raw, ruzstd::encoding::CompressionLevel::Fastest)
}
