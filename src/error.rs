use thiserror::Error;

use crate::writer::EventKind;

#[derive(Debug, Clone, Copy)]
pub struct ConversionError {
    pub from: &'static str,
    pub into: &'static str,
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot convert {} into {}", self.from, self.into)
    }
}

#[derive(Error, Debug, Clone, Copy)]
pub enum LookupError {
    #[error("not defined")]
    KeyError,
    #[error("{0}")]
    ConversionError(ConversionError),
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("formatting failed")]
    Format(#[from] std::fmt::Error),
    #[error("definition '{name}': {source}")]
    Definition {
        name: &'static str,
        source: LookupError,
    },
    #[error("definition '{name}' must be a positive raster time, found {value}")]
    InvalidRaster { name: &'static str, value: f64 },
    #[error("active {kind} event #{id} has an all-zero amplitude")]
    ZeroAmplitude { kind: EventKind, id: usize },
    #[error("{kind} event #{id} has {samples} samples but {steps} time steps")]
    TimingMismatch {
        kind: EventKind,
        id: usize,
        samples: usize,
        steps: usize,
    },
    #[error("{kind} event in block {block} is not registered")]
    UnresolvedObject { kind: EventKind, block: usize },
    #[error("shape of {kind} event #{id} is not registered")]
    UnresolvedShape { kind: EventKind, id: usize },
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decompression failed: {0}")]
    DecompressionError(std::io::Error),
    #[error("serialization failed: {0}")]
    SerializationError(rmp_serde::encode::Error),
    #[error("deserialization failed: {0}")]
    DeserializationError(rmp_serde::decode::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("no [SIGNATURE] section found")]
    Missing,
    #[error("unsupported signature type '{0}'")]
    UnsupportedType(String),
    #[error("signature section has no hash")]
    MissingHash,
    #[error("hash mismatch (stored {stored}, computed {computed})")]
    Mismatch { stored: String, computed: String },
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("loading the sequence failed: {0}")]
    Load(#[from] LoadError),
    #[error("writing the sequence failed: {0}")]
    Write(#[from] WriteError),
}
