//! `TimelineSettings` and the input-rate policy (spec.md §3, §6).

use serde::{Deserialize, Serialize};

/// How `Entity::insert_input`/`insert_quantized_input` enforce
/// `max_tick_rate` (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputRateConstraint {
    /// Time is bucketed into `1/max_tick_rate` slots; a duplicate insert
    /// into an already-occupied bucket is dropped.
    Quantized,
    /// An insert is rejected if the elapsed time since the previous input
    /// is less than `1/max_tick_rate - epsilon`.
    Variable,
}

/// Recognized Timeline configuration options (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineSettings {
    /// Upper bound on a single tick's delta; overruns are clamped, but time
    /// still advances to the target (spec.md §4.4, §9 Open Question:
    /// preserved as the source does it — time is not split into sub-steps).
    pub max_delta_time: f32,
    /// Hard cap on replay-loop iterations per Seek.
    pub max_seek_iterations: u32,
    /// Hz; used for the input-rate constraint only.
    pub max_tick_rate: f64,
    /// `Quantized` or `Variable` (see `InputRateConstraint`).
    pub max_tick_rate_constraint: InputRateConstraint,
    /// Hz; the grid for confirmed state storage and for
    /// `current`/`previous` input lookup quantization.
    pub fixed_tick_rate: f64,
    /// If true, `store_state_at` trims and replays even when the incoming
    /// state equals the stored one.
    pub always_reconcile: bool,
    /// Seconds preserved on either side of `playback_time` after each Seek.
    pub history_length: f64,
    /// Mirror Seek warnings to `tracing::warn!` in addition to the
    /// in-memory debug operation sequence.
    pub debug_log_seek_warnings: bool,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            max_delta_time: 0.25,
            max_seek_iterations: 200,
            max_tick_rate: 60.0,
            max_tick_rate_constraint: InputRateConstraint::Quantized,
            fixed_tick_rate: 60.0,
            always_reconcile: false,
            history_length: 2.0,
            debug_log_seek_warnings: false,
        }
    }
}

impl TimelineSettings {
    /// Seconds per fixed tick (`1 / fixed_tick_rate`).
    pub fn dt_tick(&self) -> f64 {
        1.0 / self.fixed_tick_rate
    }
}
