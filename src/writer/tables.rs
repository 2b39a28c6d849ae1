//! Rows of all tables, converted to the units of the file.

use super::compress::StoredShape;
use super::registry::ObjectRegistry;
use super::shape_registry::ShapeLibrary;
use super::{EventKind, Rasters, Warning, WriteOptions};
use crate::error::WriteError;
use crate::value::{Adc, Block, BlockSeq, Duration, Gradient, Pulse, Timing, Waveform};

/// Maximum deviation of a duration from its raster grid, in raster units.
const DURATION_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct BlockRow {
    pub index: usize,
    /// In block raster units
    pub duration: i64,
    pub rf: usize,
    pub gx: usize,
    pub gy: usize,
    pub gz: usize,
    pub adc: usize,
    /// Extensions are not supported, always 0
    pub ext: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RfRow {
    pub id: usize,
    /// Hz
    pub amplitude: f64,
    pub magnitude_id: usize,
    pub phase_id: usize,
    pub time_id: usize,
    /// us
    pub delay: f64,
    /// Hz
    pub frequency: f64,
    /// rad
    pub phase: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientRow {
    pub id: usize,
    /// Hz/m
    pub amplitude: f64,
    pub amplitude_id: usize,
    pub time_id: usize,
    /// us
    pub delay: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrapRow {
    pub id: usize,
    /// Hz/m
    pub amplitude: f64,
    /// us
    pub rise: f64,
    pub flat: f64,
    pub fall: f64,
    pub delay: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdcRow {
    pub id: usize,
    pub num_samples: u64,
    /// ns
    pub dwell: f64,
    /// us
    pub delay: f64,
    /// Hz
    pub frequency: f64,
    /// rad
    pub phase: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub blocks: Vec<BlockRow>,
    pub rf: Vec<RfRow>,
    pub gradients: Vec<GradientRow>,
    pub traps: Vec<TrapRow>,
    pub adc: Vec<AdcRow>,
    pub shapes: Vec<StoredShape>,
}

pub struct Registries<'r, 'a> {
    pub rf: &'r ObjectRegistry<'a, Pulse>,
    pub gradients: &'r ObjectRegistry<'a, Gradient>,
    pub adc: &'r ObjectRegistry<'a, Adc>,
}

pub fn build(
    seq: &BlockSeq,
    registries: &Registries,
    library: &ShapeLibrary,
    shapes: Vec<StoredShape>,
    rasters: &Rasters,
    opts: &WriteOptions,
    warnings: &mut Vec<Warning>,
) -> Result<Tables, WriteError> {
    let blocks = seq
        .blocks
        .iter()
        .enumerate()
        .map(|(i, block)| block_row(i + 1, block, registries, rasters, warnings))
        .collect::<Result<Vec<_>, _>>()?;

    let rf = registries
        .rf
        .iter()
        .map(|(pulse, id)| {
            let ids = library.rf(id).ok_or(WriteError::UnresolvedShape {
                kind: EventKind::Rf,
                id,
            })?;
            if let Waveform::Samples(samples) = &pulse.amplitude {
                let (timing, count) = (&pulse.timing, samples.len());
                check_uniform(EventKind::Rf, id, timing, count, rasters.rf, warnings);
            }
            Ok(RfRow {
                id,
                amplitude: opts.gamma * ids.peak,
                magnitude_id: ids.magnitude,
                phase_id: ids.phase,
                time_id: ids.time,
                delay: raster_delay(pulse.delay, rasters.rf, ids.time == 0),
                frequency: pulse.frequency_offset,
                phase: ids.phase_offset,
            })
        })
        .collect::<Result<Vec<_>, WriteError>>()?;

    let mut gradients = Vec::new();
    let mut traps = Vec::new();
    for (grad, id) in registries.gradients.iter() {
        let unresolved = WriteError::UnresolvedShape {
            kind: EventKind::Gradient,
            id,
        };
        match (grad, library.gradient(id)) {
            (Gradient::Trap(trap), Some(None)) => traps.push(TrapRow {
                id,
                amplitude: opts.gamma * trap.amplitude,
                rise: to_us(trap.rise_time),
                flat: to_us(trap.flat_time),
                fall: to_us(trap.fall_time),
                delay: to_us(trap.delay),
            }),
            (Gradient::Arbitrary(arb), Some(Some(ids))) => {
                check_uniform(
                    EventKind::Gradient,
                    id,
                    &arb.timing,
                    arb.amplitude.len(),
                    rasters.gradient,
                    warnings,
                );
                gradients.push(GradientRow {
                    id,
                    amplitude: opts.gamma * ids.peak,
                    amplitude_id: ids.amplitude,
                    time_id: ids.time,
                    delay: raster_delay(arb.delay, rasters.gradient, ids.time == 0),
                })
            }
            _ => return Err(unresolved),
        }
    }

    let adc = registries
        .adc
        .iter()
        .map(|(adc, id)| AdcRow {
            id,
            num_samples: adc.sample_count,
            dwell: adc.dwell_time * 1e9,
            delay: to_us(adc.delay),
            frequency: adc.frequency_offset,
            phase: adc.phase_offset,
        })
        .collect();

    Ok(Tables {
        blocks,
        rf,
        gradients,
        traps,
        adc,
        shapes,
    })
}

fn block_row(
    index: usize,
    block: &Block,
    registries: &Registries,
    rasters: &Rasters,
    warnings: &mut Vec<Warning>,
) -> Result<BlockRow, WriteError> {
    let duration = block.calc_duration();
    let steps = duration / rasters.block;
    let rounded = steps.round_ties_even();
    if (steps - rounded).abs() > DURATION_TOLERANCE {
        warnings.push(Warning::BlockDurationRounding {
            block: index,
            duration,
            rounded: rounded as i64,
        });
    }

    let unresolved = |kind| WriteError::UnresolvedObject {
        kind,
        block: index,
    };
    let gradient = |g: &Option<Gradient>| {
        registries
            .gradients
            .resolve(g.as_ref())
            .ok_or(unresolved(EventKind::Gradient))
    };

    Ok(BlockRow {
        index,
        duration: rounded as i64,
        rf: registries
            .rf
            .resolve(block.rf.as_ref())
            .ok_or(unresolved(EventKind::Rf))?,
        gx: gradient(&block.gx)?,
        gy: gradient(&block.gy)?,
        gz: gradient(&block.gz)?,
        adc: registries
            .adc
            .resolve(block.adc.as_ref())
            .ok_or(unresolved(EventKind::Adc))?,
        ext: 0,
    })
}

/// Uniform timing places one sample per raster step, the given duration is not written.
fn check_uniform(
    kind: EventKind,
    id: usize,
    timing: &Timing,
    samples: usize,
    raster: f64,
    warnings: &mut Vec<Warning>,
) {
    let Timing::Uniform(duration) = *timing else {
        return;
    };
    if (duration / raster - samples as f64).abs() > DURATION_TOLERANCE {
        warnings.push(Warning::UniformTimingMismatch {
            kind,
            id,
            duration,
            samples,
        });
    }
}

fn to_us(seconds: f64) -> f64 {
    seconds * 1e6
}

/// Delay in us, on the raster. Without a time shape the samples are placed at
/// the centers of the raster intervals, so the delay moves back half a raster.
fn raster_delay(delay: f64, raster: f64, centered: bool) -> f64 {
    let start = if centered {
        delay - 0.5 * raster
    } else {
        delay
    };
    // adding 0.0 turns a negative zero into zero
    to_us((start / raster).round_ties_even() * raster) + 0.0
}
