use std::fmt::Debug;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::Definitions;

/// An MRI sequence which consists of a series of blocks, each of which can have multiple, ongoing events.
///
/// This is modelled very close to Pulseq, so that it can be written to a `.seq` file
/// without losing pulse shapes, gradient waveforms or timing details.
/// The writer only reads it, it is never modified.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BlockSeq {
    pub blocks: Vec<Block>,
    pub definitions: Definitions,
}

#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct Block {
    /// Minimum duration of this block, can be longer if events exceed this
    pub min_duration: f64,
    pub rf: Option<Pulse>,
    pub gx: Option<Gradient>,
    pub gy: Option<Gradient>,
    pub gz: Option<Gradient>,
    pub adc: Option<Adc>,
    /// Extension labels (counters, flags). Kept in the model, not encoded in the file.
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// RF pulse. Amplitudes are in Tesla, times in seconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pulse {
    pub amplitude: Waveform<Complex64>,
    pub timing: Timing,
    pub delay: f64,
    pub frequency_offset: f64,
}

/// Sample values of an RF or gradient event.
#[derive(Clone, Serialize, Deserialize)]
pub enum Waveform<T> {
    /// A single amplitude held for the whole duration (hard pulse)
    Constant(T),
    Samples(Vec<T>),
}

impl<T> Debug for Waveform<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Waveform::Constant(x) => write!(f, "Constant({x:?})"),
            Waveform::Samples(x) => write!(f, "Samples( <{} samples> )", x.len()),
        }
    }
}

/// Timing of the samples of a [`Waveform`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Timing {
    /// Total duration. Samples sit on the raster of their event kind.
    Uniform(f64),
    /// Explicit durations between consecutive samples, one less than there are samples.
    Steps(Vec<f64>),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Gradient {
    Trap(TrapGradient),
    Arbitrary(ArbitraryGradient),
}

/// Amplitude in T/m, times in seconds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TrapGradient {
    pub amplitude: f64,
    pub delay: f64,
    pub rise_time: f64,
    pub flat_time: f64,
    pub fall_time: f64,
}

/// Sampled gradient waveform, amplitudes in T/m.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArbitraryGradient {
    pub amplitude: Vec<f64>,
    pub timing: Timing,
    pub delay: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Adc {
    pub sample_count: u64,
    pub dwell_time: f64,
    pub delay: f64,
    pub phase_offset: f64,
    pub frequency_offset: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: i64,
}

// ================
// Useful functions
// ================

impl Timing {
    pub fn total(&self) -> f64 {
        match self {
            Timing::Uniform(t) => *t,
            Timing::Steps(dt) => dt.iter().sum(),
        }
    }
}

pub trait Duration {
    fn calc_duration(&self) -> f64;
}

impl<T: Duration> Duration for Option<T> {
    fn calc_duration(&self) -> f64 {
        self.as_ref().map_or(0.0, |inner| inner.calc_duration())
    }
}

impl Duration for Pulse {
    fn calc_duration(&self) -> f64 {
        self.delay + self.timing.total()
    }
}

impl Duration for Gradient {
    fn calc_duration(&self) -> f64 {
        match self {
            Gradient::Trap(g) => g.delay + g.rise_time + g.flat_time + g.fall_time,
            Gradient::Arbitrary(g) => g.delay + g.timing.total(),
        }
    }
}

impl Duration for Adc {
    fn calc_duration(&self) -> f64 {
        self.delay + self.sample_count as f64 * self.dwell_time
    }
}

impl Duration for Block {
    fn calc_duration(&self) -> f64 {
        [
            self.min_duration,
            self.rf.calc_duration(),
            self.gx.calc_duration(),
            self.gy.calc_duration(),
            self.gz.calc_duration(),
            self.adc.calc_duration(),
        ]
        .into_iter()
        .max_by(|x, y| x.total_cmp(y))
        .unwrap_or(0.0)
    }
}
