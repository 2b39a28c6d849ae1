use crate::value::{Adc, Gradient, Pulse, Waveform};

/// Whether an event does anything. Events which are off are treated as absent.
pub trait IsOn {
    fn is_on(&self) -> bool;
}

impl IsOn for Pulse {
    fn is_on(&self) -> bool {
        match &self.amplitude {
            Waveform::Constant(a) => a.norm() > 0.0,
            Waveform::Samples(a) => a.iter().map(|x| x.norm()).sum::<f64>() > 0.0,
        }
    }
}

impl IsOn for Gradient {
    fn is_on(&self) -> bool {
        match self {
            Gradient::Trap(g) => g.amplitude.abs() > 0.0,
            Gradient::Arbitrary(g) => g.amplitude.iter().map(|x| x.abs()).sum::<f64>() > 0.0,
        }
    }
}

impl IsOn for Adc {
    fn is_on(&self) -> bool {
        self.sample_count > 0
    }
}

/// Keep only events that are present and on, in channel order.
pub fn active<'a, E: IsOn + 'a>(
    events: impl IntoIterator<Item = Option<&'a E>>,
) -> impl Iterator<Item = &'a E> {
    events.into_iter().flatten().filter(|e| e.is_on())
}
