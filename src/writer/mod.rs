//! Serialization of a [`BlockSeq`] into a Pulseq 1.4 `.seq` file.
//!
//! The pipeline runs strictly in one direction:
//! active events are filtered per channel, deduplicated per event kind,
//! turned into canonical shapes, deduplicated again with one shared shape id
//! counter, compressed, assembled into tables and finally rendered into text
//! sections followed by an md5 signature.

use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::BlockSeq;
use crate::error::WriteError;
use crate::value::{
    ADC_RASTER_TIME, BLOCK_DURATION_RASTER, Definitions, GRADIENT_RASTER_TIME, RF_RASTER_TIME,
};

pub mod approx;
mod compress;
mod filter;
mod format;
mod registry;
mod sections;
mod shape;
mod shape_registry;
mod signature;
mod tables;

pub use signature::verify_signature;

/// Gyromagnetic ratio of hydrogen in Hz/T.
pub const GAMMA_H1: f64 = 42.577478518e6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// File format version written to `[VERSION]`
    pub version: Version,
    /// Converts RF amplitudes (T) to Hz and gradient amplitudes (T/m) to Hz/m
    pub gamma: f64,
    /// Store shapes in the compressed (derivative + run length) encoding if it is shorter
    pub compress_shapes: bool,
    /// Written into the file header comment
    pub creator: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            version: Version {
                major: 1,
                minor: 4,
                revision: 1,
            },
            gamma: GAMMA_H1,
            compress_shapes: true,
            creator: concat!("pulseq-writer ", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Rf,
    Gradient,
    Adc,
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EventKind::Rf => "RF",
            EventKind::Gradient => "gradient",
            EventKind::Adc => "ADC",
        })
    }
}

/// Problems which do not stop the file from being written.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Block duration is not a multiple of the block raster, the rounded value was written
    BlockDurationRounding {
        block: usize,
        duration: f64,
        rounded: i64,
    },
    /// Extension labels are not supported and were left out of the file
    ExtensionsIgnored { blocks: usize },
    /// Uniformly timed samples are written on the raster, which does not add up to the event duration
    UniformTimingMismatch {
        kind: EventKind,
        id: usize,
        duration: f64,
        samples: usize,
    },
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::BlockDurationRounding {
                block,
                duration,
                rounded,
            } => write!(
                f,
                "block {block}: duration of {duration} s is not on the block raster, rounded to {rounded} raster steps"
            ),
            Warning::ExtensionsIgnored { blocks } => write!(
                f,
                "{blocks} blocks contain extension labels, which are not written"
            ),
            Warning::UniformTimingMismatch {
                kind,
                id,
                duration,
                samples,
            } => write!(
                f,
                "{kind} event #{id}: {samples} samples on the raster do not last {duration} s"
            ),
        }
    }
}

/// Raster times in seconds, read from the sequence definitions.
#[derive(Debug, Clone, Copy)]
pub struct Rasters {
    pub rf: f64,
    pub gradient: f64,
    pub block: f64,
}

impl Rasters {
    pub fn from_definitions(defs: &Definitions) -> Result<Self, WriteError> {
        fn raster(defs: &Definitions, name: &'static str) -> Result<f64, WriteError> {
            let value = defs
                .get_number(name)
                .map_err(|source| WriteError::Definition { name, source })?;
            if value > 0.0 && value.is_finite() {
                Ok(value)
            } else {
                Err(WriteError::InvalidRaster { name, value })
            }
        }

        if defs.contains(ADC_RASTER_TIME) {
            raster(defs, ADC_RASTER_TIME)?;
        }

        Ok(Self {
            rf: raster(defs, RF_RASTER_TIME)?,
            gradient: raster(defs, GRADIENT_RASTER_TIME)?,
            block: raster(defs, BLOCK_DURATION_RASTER)?,
        })
    }
}

/// A fully rendered file, split at the signature boundary.
#[derive(Debug, Clone)]
pub struct RenderedSeq {
    /// Everything the signature is computed over
    pub body: String,
    /// The `[SIGNATURE]` section including its leading newline
    pub signature: String,
    pub hash: String,
    pub warnings: Vec<Warning>,
}

impl RenderedSeq {
    pub fn contents(&self) -> String {
        [self.body.as_str(), self.signature.as_str()].concat()
    }
}

#[derive(Debug, Clone)]
pub struct WriteReport {
    pub hash: String,
    pub warnings: Vec<Warning>,
}

/// Render `seq` into the text of a `.seq` file without touching the file system.
pub fn render_seq(seq: &BlockSeq, opts: &WriteOptions) -> Result<RenderedSeq, WriteError> {
    let rasters = Rasters::from_definitions(&seq.definitions)?;
    let mut warnings = Vec::new();

    let labelled = seq.blocks.iter().filter(|b| !b.labels.is_empty()).count();
    if labelled > 0 {
        warnings.push(Warning::ExtensionsIgnored { blocks: labelled });
    }

    let rf = registry::ObjectRegistry::register(filter::active(
        seq.blocks.iter().map(|b| b.rf.as_ref()),
    ));
    let gradients = registry::ObjectRegistry::register(filter::active(
        seq.blocks
            .iter()
            .flat_map(|b| [b.gx.as_ref(), b.gy.as_ref(), b.gz.as_ref()]),
    ));
    let adc = registry::ObjectRegistry::register(filter::active(
        seq.blocks.iter().map(|b| b.adc.as_ref()),
    ));
    debug!(
        rf = rf.len(),
        gradients = gradients.len(),
        adc = adc.len(),
        "registered unique events"
    );

    let library = shape_registry::ShapeLibrary::build(&rf, &gradients, &rasters)?;
    let shapes = compress::store_all(library.shapes(), opts.compress_shapes);
    debug!(shapes = shapes.len(), "registered unique shapes");

    let registries = tables::Registries {
        rf: &rf,
        gradients: &gradients,
        adc: &adc,
    };
    let tables = tables::build(
        seq,
        &registries,
        &library,
        shapes,
        &rasters,
        opts,
        &mut warnings,
    )?;

    let body = sections::render(&seq.definitions, &tables, opts)?;
    let hash = signature::digest(body.as_bytes());
    let signature = signature::section(&hash);

    for warning in &warnings {
        warn!("{warning}");
    }

    Ok(RenderedSeq {
        body,
        signature,
        hash,
        warnings,
    })
}

/// Write `seq` to a `.seq` file at `path`, overwriting it.
///
/// The body is written first, then the file is reopened in append mode to add
/// the signature computed over the body.
pub fn write_seq(
    seq: &BlockSeq,
    path: impl AsRef<Path>,
    opts: &WriteOptions,
) -> Result<WriteReport, WriteError> {
    let path = path.as_ref();
    let rendered = render_seq(seq, opts)?;

    {
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(rendered.body.as_bytes())?;
        file.flush()?;
    }
    {
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(rendered.signature.as_bytes())?;
        file.flush()?;
    }

    info!(path = %path.display(), hash = %rendered.hash, "wrote sequence");
    Ok(WriteReport {
        hash: rendered.hash,
        warnings: rendered.warnings,
    })
}
