//! `ClockSyncSettings` - tunables for the drift-correction loop (spec.md
//! §4.5 [ClockSync]).

use serde::{Deserialize, Serialize};

/// How a pending `remaining_adjustment` is drained into `auto_offset` each
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AdjustmentMode {
    /// Shift by a constant `linear_speed` per second, snapping once the
    /// correction has run for `max_adjustment_duration`.
    Linear,
    /// Critically-damped smoothing once the remaining correction is under
    /// one second; larger corrections snap immediately rather than
    /// smoothing slowly toward a stale target.
    Curved,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockSyncSettings {
    /// Seconds of `(local_time, client_offset)` samples kept for
    /// percentile filtering.
    pub sample_period: f64,
    /// Minimum seconds between recalculations.
    pub seconds_per_recalculation: f64,
    /// Extra seconds added after each recalculation before the next one
    /// is eligible.
    pub recalculation_cooldown: f64,
    /// Percentile (0.0-1.0) of the sorted offset window used as the new
    /// correction target; low percentiles bias toward "client is ahead
    /// enough that inputs arrive before authority needs them".
    pub percentile: f64,
    /// Extra lead time folded into every recalculated target, on top of
    /// the percentile itself.
    pub additional_prediction_amount: f64,
    pub adjustment_mode: AdjustmentMode,
    /// Seconds of offset corrected per second of local time (Linear mode).
    pub linear_speed: f64,
    /// Spring stiffness for Curved mode's critically-damped smoothing.
    pub curved_damping: f64,
    /// Hard cap on how long a Linear correction may run before snapping.
    pub max_adjustment_duration: f64,
    /// How many `ClockSyncTick`s are emitted per second of game time.
    pub syncs_per_second: f64,
}

impl Default for ClockSyncSettings {
    fn default() -> Self {
        Self {
            sample_period: 2.0,
            seconds_per_recalculation: 1.0,
            recalculation_cooldown: 0.25,
            percentile: 0.02,
            additional_prediction_amount: 0.0,
            adjustment_mode: AdjustmentMode::Curved,
            linear_speed: 0.5,
            curved_damping: 8.0,
            max_adjustment_duration: 2.0,
            syncs_per_second: 20.0,
        }
    }
}
