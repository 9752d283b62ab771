use super::ParsedSample;

/// Final output for one target: ascending by timestamp, no repeated
/// (timestamp, value) pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    samples: Vec<ParsedSample>,
}

impl Series {
    pub fn samples(&self) -> &[ParsedSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Collects samples across one sweep, in any order.
///
/// Overlapping sweep positions read the same tooltip more than once, so
/// duplicates are expected. They are removed by exact (timestamp, value)
/// equality, never by timestamp alone.
#[derive(Debug, Default)]
pub struct SampleAggregator {
    samples: Vec<ParsedSample>,
}

impl SampleAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: ParsedSample) {
        self.samples.push(sample);
    }

    /// Number of accepted reads so far, duplicates included.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sorts by (timestamp, value) and drops exact duplicates.
    pub fn finalize(self) -> Series {
        let mut samples = self.samples;
        samples.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then(a.value.total_cmp(&b.value))
        });
        samples
            .dedup_by(|a, b| a.timestamp == b.timestamp && a.value.to_bits() == b.value.to_bits());
        Series { samples }
    }
}
