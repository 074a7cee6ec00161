//! Sliding window of `(local_time, client_offset)` samples used to filter
//! network jitter out of the drift-correction target (spec.md §4.5).

use std::collections::VecDeque;

use timeline_core::GameTime;

#[derive(Debug, Clone, Default)]
pub struct SampleWindow {
    samples: VecDeque<(GameTime, f32)>,
}

impl SampleWindow {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::new(),
        }
    }

    /// Record a sample at `local_time`, then evict anything older than
    /// `period` seconds relative to it.
    pub fn push(&mut self, local_time: GameTime, offset: f32, period: f64) {
        self.samples.push_back((local_time, offset));
        let cutoff = local_time - period;
        while matches!(self.samples.front(), Some((t, _)) if *t < cutoff) {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The value at `percentile` (0.0-1.0) of the ascending-sorted offset
    /// samples, or `None` if the window holds no samples (spec.md §4.5
    /// failure mode: "no samples in window").
    pub fn percentile(&self, percentile: f64) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        let mut offsets: Vec<f32> = self.samples.iter().map(|(_, o)| *o).collect();
        offsets.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let idx = ((offsets.len() as f64) * percentile).floor() as usize;
        Some(offsets[idx.min(offsets.len() - 1)])
    }
}
