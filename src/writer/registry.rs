use super::approx::Approx;
use super::filter::IsOn;

/// Unique events of one kind, numbered 1, 2, 3... in order of first occurrence.
#[derive(Debug)]
pub struct ObjectRegistry<'a, E> {
    entries: Vec<(&'a E, usize)>,
}

impl<'a, E: Approx + IsOn> ObjectRegistry<'a, E> {
    pub fn register(events: impl IntoIterator<Item = &'a E>) -> Self {
        let mut registry = Self {
            entries: Vec::new(),
        };
        for event in events {
            if registry.find(event).is_none() {
                let id = registry.entries.len() + 1;
                registry.entries.push((event, id));
            }
        }
        registry
    }

    pub fn find(&self, event: &E) -> Option<usize> {
        self.entries
            .iter()
            .find(|(known, _)| known.approx_eq(event))
            .map(|(_, id)| *id)
    }

    /// Id of the event in a block: `Some(0)` if there is none or it is off,
    /// `None` if an active event is not registered.
    pub fn resolve(&self, event: Option<&E>) -> Option<usize> {
        match event {
            Some(event) if event.is_on() => self.find(event),
            _ => Some(0),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a E, usize)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Adc;

    fn adc(sample_count: u64, delay: f64) -> Adc {
        Adc {
            sample_count,
            dwell_time: 10e-6,
            delay,
            phase_offset: 0.0,
            frequency_offset: 0.0,
        }
    }

    #[test]
    fn ids_in_first_seen_order() {
        let events = [adc(64, 0.0), adc(128, 0.0), adc(64, 0.0), adc(64, 20e-6)];
        let registry = ObjectRegistry::register(&events);

        assert_eq!(registry.len(), 3);
        let ids: Vec<_> = events.iter().map(|e| registry.find(e)).collect();
        assert_eq!(ids, [Some(1), Some(2), Some(1), Some(3)]);
    }

    #[test]
    fn near_equal_events_share_an_id() {
        let events = [adc(64, 1.0), adc(64, 1.0 + 1e-12)];
        let registry = ObjectRegistry::register(&events);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolve_blocks() {
        let events = [adc(64, 0.0)];
        let registry = ObjectRegistry::register(&events);

        assert_eq!(registry.resolve(None), Some(0));
        assert_eq!(registry.resolve(Some(&adc(0, 0.0))), Some(0));
        assert_eq!(registry.resolve(Some(&adc(64, 0.0))), Some(1));
        assert_eq!(registry.resolve(Some(&adc(32, 0.0))), None);
    }
}
