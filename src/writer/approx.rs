//! Tolerance based equality used to deduplicate events and shapes.
//!
//! Two numbers are equal if `|a - b| <= RTOL * max(|a|, |b|)`. Containers are
//! equal if they have the same number of components and all of them are equal.
//! The relation is not transitive, lookups therefore scan linearly instead of hashing.

use num_complex::Complex64;

use crate::value::{Adc, ArbitraryGradient, Gradient, Pulse, Timing, TrapGradient, Waveform};

/// Relative tolerance, the square root of the machine epsilon.
pub const RTOL: f64 = 1.4901161193847656e-8;

pub trait Approx {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl Approx for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        self == other || (self - other).abs() <= RTOL * self.abs().max(other.abs())
    }
}

impl Approx for u64 {
    fn approx_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl Approx for Complex64 {
    fn approx_eq(&self, other: &Self) -> bool {
        self == other || (self - other).norm() <= RTOL * self.norm().max(other.norm())
    }
}

impl<T: Approx> Approx for [T] {
    fn approx_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.approx_eq(b))
    }
}

impl<T: Approx> Approx for Vec<T> {
    fn approx_eq(&self, other: &Self) -> bool {
        self.as_slice().approx_eq(other.as_slice())
    }
}

impl<T: Approx> Approx for Waveform<T> {
    fn approx_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Waveform::Constant(a), Waveform::Constant(b)) => a.approx_eq(b),
            (Waveform::Samples(a), Waveform::Samples(b)) => a.approx_eq(b),
            _ => false,
        }
    }
}

impl Approx for Timing {
    fn approx_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Timing::Uniform(a), Timing::Uniform(b)) => a.approx_eq(b),
            (Timing::Steps(a), Timing::Steps(b)) => a.approx_eq(b),
            _ => false,
        }
    }
}

impl Approx for Pulse {
    fn approx_eq(&self, other: &Self) -> bool {
        self.amplitude.approx_eq(&other.amplitude)
            && self.timing.approx_eq(&other.timing)
            && self.delay.approx_eq(&other.delay)
            && self.frequency_offset.approx_eq(&other.frequency_offset)
    }
}

impl Approx for TrapGradient {
    fn approx_eq(&self, other: &Self) -> bool {
        self.amplitude.approx_eq(&other.amplitude)
            && self.delay.approx_eq(&other.delay)
            && self.rise_time.approx_eq(&other.rise_time)
            && self.flat_time.approx_eq(&other.flat_time)
            && self.fall_time.approx_eq(&other.fall_time)
    }
}

impl Approx for ArbitraryGradient {
    fn approx_eq(&self, other: &Self) -> bool {
        self.amplitude.approx_eq(&other.amplitude)
            && self.timing.approx_eq(&other.timing)
            && self.delay.approx_eq(&other.delay)
    }
}

impl Approx for Gradient {
    fn approx_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Gradient::Trap(a), Gradient::Trap(b)) => a.approx_eq(b),
            (Gradient::Arbitrary(a), Gradient::Arbitrary(b)) => a.approx_eq(b),
            _ => false,
        }
    }
}

impl Approx for Adc {
    fn approx_eq(&self, other: &Self) -> bool {
        self.sample_count.approx_eq(&other.sample_count)
            && self.dwell_time.approx_eq(&other.dwell_time)
            && self.delay.approx_eq(&other.delay)
            && self.phase_offset.approx_eq(&other.phase_offset)
            && self.frequency_offset.approx_eq(&other.frequency_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert!(1.0_f64.approx_eq(&(1.0 + 1e-12)));
        assert!(!1.0_f64.approx_eq(&1.001));
        assert!(0.0_f64.approx_eq(&0.0));
        assert!(!0.0_f64.approx_eq(&1e-300));
    }

    #[test]
    fn slices_need_equal_length() {
        assert!(vec![1.0_f64, 2.0].approx_eq(&vec![1.0, 2.0 + 1e-14]));
        assert!(!vec![1.0_f64, 2.0].approx_eq(&vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn trap_and_arbitrary_never_match() {
        let trap = Gradient::Trap(TrapGradient {
            amplitude: 1.0,
            delay: 0.0,
            rise_time: 1.0,
            flat_time: 1.0,
            fall_time: 1.0,
        });
        let arb = Gradient::Arbitrary(ArbitraryGradient {
            amplitude: vec![1.0],
            timing: Timing::Uniform(1.0),
            delay: 0.0,
        });
        assert!(trap.approx_eq(&trap));
        assert!(!trap.approx_eq(&arb));
    }
}
