//! Canonical (normalized) shapes of RF pulses and arbitrary gradients.
//!
//! Phases are stored in turns, in `[0, 1)`. Time shapes are sample times in
//! units of the raster of the event kind, starting at 0.

use std::f64::consts::TAU;

use num_complex::Complex64;

use super::EventKind;
use crate::error::WriteError;
use crate::value::{ArbitraryGradient, Pulse, Timing, Waveform};

#[derive(Debug, Clone)]
pub struct RfShapes {
    /// Maximum absolute amplitude in T
    pub peak: f64,
    pub magnitude: Vec<f64>,
    pub phase: Vec<f64>,
    pub time: Option<Vec<f64>>,
}

#[derive(Debug, Clone)]
pub struct GradientShapes {
    /// Maximum absolute amplitude in T/m
    pub peak: f64,
    /// Signed amplitude, divided by `peak`
    pub amplitude: Vec<f64>,
    pub time: Option<Vec<f64>>,
}

/// A hard pulse (constant amplitude) is described by two samples at its start
/// and end, so it always has an explicit time shape.
pub fn rf_shapes(pulse: &Pulse, raster: f64, id: usize) -> Result<RfShapes, WriteError> {
    let (samples, time) = match &pulse.amplitude {
        Waveform::Constant(a) => (
            vec![*a, *a],
            Some(vec![0.0, pulse.timing.total() / raster]),
        ),
        Waveform::Samples(a) => (
            a.clone(),
            time_shape(&pulse.timing, a.len(), raster, EventKind::Rf, id)?,
        ),
    };

    let peak = samples.iter().map(|x| x.norm()).fold(0.0, f64::max);
    if peak == 0.0 {
        return Err(WriteError::ZeroAmplitude {
            kind: EventKind::Rf,
            id,
        });
    }

    Ok(RfShapes {
        peak,
        magnitude: samples.iter().map(|x| x.norm() / peak).collect(),
        phase: samples.iter().map(phase_turns).collect(),
        time,
    })
}

pub fn gradient_shapes(
    grad: &ArbitraryGradient,
    raster: f64,
    id: usize,
) -> Result<GradientShapes, WriteError> {
    let peak = grad.amplitude.iter().map(|x| x.abs()).fold(0.0, f64::max);
    if peak == 0.0 {
        return Err(WriteError::ZeroAmplitude {
            kind: EventKind::Gradient,
            id,
        });
    }

    Ok(GradientShapes {
        peak,
        amplitude: grad.amplitude.iter().map(|x| x / peak).collect(),
        time: time_shape(
            &grad.timing,
            grad.amplitude.len(),
            raster,
            EventKind::Gradient,
            id,
        )?,
    })
}

fn phase_turns(x: &Complex64) -> f64 {
    let turns = x.arg().rem_euclid(TAU) / TAU;
    // rem_euclid of a tiny negative angle can round up to a full turn
    if turns >= 1.0 { 0.0 } else { turns }
}

/// Cumulative sample times for explicit step timing, `None` for uniform timing.
fn time_shape(
    timing: &Timing,
    samples: usize,
    raster: f64,
    kind: EventKind,
    id: usize,
) -> Result<Option<Vec<f64>>, WriteError> {
    let Timing::Steps(steps) = timing else {
        return Ok(None);
    };
    if steps.len() + 1 != samples {
        return Err(WriteError::TimingMismatch {
            kind,
            id,
            samples,
            steps: steps.len(),
        });
    }

    let time = std::iter::once(0.0)
        .chain(steps.iter().scan(0.0, |t, dt| {
            *t += dt;
            Some(*t)
        }))
        .map(|t| t / raster)
        .collect();
    Ok(Some(time))
}
