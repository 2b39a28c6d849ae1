//! Deduplication of canonical shapes.
//!
//! There are five tables (RF magnitude, RF phase, RF time, gradient amplitude,
//! gradient time), but only one id counter. It is passed into every
//! registration and handed back, advanced if a new shape was added, so the
//! ids of all tables together are `1..=n` without gaps.

use std::f64::consts::TAU;

use num_complex::Complex64;

use super::Rasters;
use super::approx::{Approx, RTOL};
use super::registry::ObjectRegistry;
use super::shape::{GradientShapes, RfShapes, gradient_shapes, rf_shapes};
use crate::error::WriteError;
use crate::value::{Gradient, Pulse};

/// Shapes compared with [`Approx`].
#[derive(Debug, Default)]
pub struct ShapeTable {
    entries: Vec<(Vec<f64>, usize)>,
}

impl ShapeTable {
    /// Returns the id of `shape` and the next free id.
    pub fn register(&mut self, shape: Vec<f64>, counter: usize) -> (usize, usize) {
        match self.find(&shape) {
            Some(id) => (id, counter),
            None => {
                self.entries.push((shape, counter));
                (counter, counter + 1)
            }
        }
    }

    pub fn find(&self, shape: &[f64]) -> Option<usize> {
        self.entries
            .iter()
            .find(|(known, _)| known.len() == shape.len() && known.as_slice().approx_eq(shape))
            .map(|(_, id)| *id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseMatch {
    pub id: usize,
    /// Phase (rad) to add to the registered shape to get the matched one
    pub offset: f64,
}

/// Phase shapes (in turns) that are equal up to a constant rotation share an entry.
#[derive(Debug, Default)]
pub struct PhaseTable {
    entries: Vec<(Vec<f64>, usize)>,
}

impl PhaseTable {
    pub fn register(&mut self, shape: Vec<f64>, counter: usize) -> (PhaseMatch, usize) {
        match self.find(&shape) {
            Some(found) => (found, counter),
            None => {
                self.entries.push((shape, counter));
                let found = PhaseMatch {
                    id: counter,
                    offset: 0.0,
                };
                (found, counter + 1)
            }
        }
    }

    pub fn find(&self, shape: &[f64]) -> Option<PhaseMatch> {
        self.entries.iter().find_map(|(known, id)| {
            circular_offset(shape, known).map(|offset| PhaseMatch { id: *id, offset })
        })
    }
}

/// If `a` and `b` only differ by a constant phase, return that phase in rad (`a - b`).
///
/// Both shapes are referenced to their first sample; they are equal if every
/// referenced difference, wrapped into half a turn, is within [`RTOL`] turns.
pub fn circular_offset(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let constant = a.iter().zip(b).all(|(x, y)| {
        let diff = (x - a[0]) - (y - b[0]);
        (diff - diff.round()).abs() <= RTOL
    });
    if !constant {
        return None;
    }

    let mean: Complex64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| Complex64::cis(TAU * (x - y)))
        .sum::<Complex64>()
        / a.len() as f64;
    Some(mean.arg())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RfShapeIds {
    pub peak: f64,
    pub magnitude: usize,
    pub phase: usize,
    /// 0 if the pulse uses the default raster timing
    pub time: usize,
    pub phase_offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientShapeIds {
    pub peak: f64,
    pub amplitude: usize,
    pub time: usize,
}

/// Shape ids of every unique RF pulse and arbitrary gradient, together with the shapes.
#[derive(Debug)]
pub struct ShapeLibrary {
    /// Indexed by RF id - 1
    rf: Vec<RfShapeIds>,
    /// Indexed by gradient id - 1, `None` for trapezoids
    gradients: Vec<Option<GradientShapeIds>>,
    shapes: Vec<(usize, Vec<f64>)>,
}

impl ShapeLibrary {
    pub fn build(
        rf: &ObjectRegistry<'_, Pulse>,
        gradients: &ObjectRegistry<'_, Gradient>,
        rasters: &Rasters,
    ) -> Result<Self, WriteError> {
        let rf_canon = rf
            .iter()
            .map(|(pulse, id)| rf_shapes(pulse, rasters.rf, id))
            .collect::<Result<Vec<RfShapes>, _>>()?;
        let grad_canon = gradients
            .iter()
            .map(|(grad, id)| match grad {
                Gradient::Trap(_) => Ok(None),
                Gradient::Arbitrary(g) => gradient_shapes(g, rasters.gradient, id).map(Some),
            })
            .collect::<Result<Vec<Option<GradientShapes>>, _>>()?;

        let mut counter = 1;
        let mut shapes = Vec::new();

        let mut magnitudes = ShapeTable::default();
        let mut magnitude_ids = Vec::with_capacity(rf_canon.len());
        for canon in &rf_canon {
            let id;
            (id, counter) = magnitudes.register(canon.magnitude.clone(), counter);
            magnitude_ids.push(id);
        }

        let mut phases = PhaseTable::default();
        let mut phase_ids = Vec::with_capacity(rf_canon.len());
        for canon in &rf_canon {
            let found;
            (found, counter) = phases.register(canon.phase.clone(), counter);
            phase_ids.push(found);
        }

        let mut rf_times = ShapeTable::default();
        let mut rf_time_ids = Vec::with_capacity(rf_canon.len());
        for canon in &rf_canon {
            let mut id = 0;
            if let Some(time) = &canon.time {
                (id, counter) = rf_times.register(time.clone(), counter);
            }
            rf_time_ids.push(id);
        }

        let mut amplitudes = ShapeTable::default();
        let mut amplitude_ids = Vec::with_capacity(grad_canon.len());
        for canon in &grad_canon {
            let mut id = 0;
            if let Some(canon) = canon {
                (id, counter) = amplitudes.register(canon.amplitude.clone(), counter);
            }
            amplitude_ids.push(id);
        }

        let mut grad_times = ShapeTable::default();
        let mut grad_time_ids = Vec::with_capacity(grad_canon.len());
        for canon in &grad_canon {
            let mut id = 0;
            if let Some(time) = canon.as_ref().and_then(|c| c.time.as_ref()) {
                (id, counter) = grad_times.register(time.clone(), counter);
            }
            grad_time_ids.push(id);
        }

        for table in [magnitudes, rf_times, amplitudes, grad_times] {
            shapes.extend(table.entries.into_iter().map(|(shape, id)| (id, shape)));
        }
        shapes.extend(phases.entries.into_iter().map(|(shape, id)| (id, shape)));
        shapes.sort_by_key(|(id, _)| *id);
        debug_assert_eq!(shapes.len() + 1, counter);

        let rf = rf_canon
            .iter()
            .enumerate()
            .map(|(i, canon)| RfShapeIds {
                peak: canon.peak,
                magnitude: magnitude_ids[i],
                phase: phase_ids[i].id,
                time: rf_time_ids[i],
                phase_offset: phase_ids[i].offset,
            })
            .collect();
        let gradients = grad_canon
            .iter()
            .enumerate()
            .map(|(i, canon)| {
                canon.as_ref().map(|canon| GradientShapeIds {
                    peak: canon.peak,
                    amplitude: amplitude_ids[i],
                    time: grad_time_ids[i],
                })
            })
            .collect();

        Ok(Self {
            rf,
            gradients,
            shapes,
        })
    }

    pub fn rf(&self, id: usize) -> Option<&RfShapeIds> {
        self.rf.get(id.checked_sub(1)?)
    }

    /// `Some(None)` for a registered trapezoid
    pub fn gradient(&self, id: usize) -> Option<Option<&GradientShapeIds>> {
        self.gradients.get(id.checked_sub(1)?).map(Option::as_ref)
    }

    /// All unique shapes sorted by id
    pub fn shapes(&self) -> &[(usize, Vec<f64>)] {
        &self.shapes
    }
}
