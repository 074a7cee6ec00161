//! Capability traits a Timeline requires of its targets (spec.md §6).
//!
//! The source implementation relies on generic parameters and interface
//! implementations per-language; here that becomes a small set of traits
//! bounding `I` (input) and `S` (state) for any `Entity<T, I, S>` (spec.md
//! §9, "Static dispatch over capability sets").

use crate::tick_info::TickInfo;
use crate::time::DeltaTime;

/// The unit of simulation a Timeline drives.
///
/// `tick` must not read wall-clock time or live inputs — all signals must
/// come from `input` (spec.md §6). Implementations are owned exclusively by
/// their `Entity` during ticks and state apply/make (spec.md §5).
pub trait Tickable<I, S> {
    /// Snapshot all simulation-affecting fields. Must be cheap and pure.
    fn make_state(&self) -> S;

    /// Fully restore from a snapshot. A subsequent `make_state()` must
    /// return a value equivalent to `state`.
    fn apply_state(&mut self, state: &S);

    /// Advance the simulation by `dt` seconds given `input`.
    fn tick(&mut self, dt: DeltaTime, input: &I, tick_info: TickInfo);
}

/// Input capability (spec.md §6): an input can be enriched with
/// edge-triggered signals relative to the previous tick's input (e.g. "jump
/// pressed this tick" derived from two raw button-held snapshots).
pub trait TickInput: Clone {
    /// Return a copy of `self` enriched with deltas versus `previous`.
    fn with_deltas(&self, previous: &Self) -> Self;
}

/// State capability (spec.md §6): value equality, used by Seek to decide
/// whether a `store_state_at` correction actually differs from the stored
/// entry (spec.md §4.2, §6 `always_reconcile`).
pub trait TickState: Clone + PartialEq {
    /// Optional human-readable field-wise diff against `other`, for
    /// debug-only reconcile diagnostics (spec.md §9). The default
    /// implementation reports only whether the states differ; targets that
    /// want a detailed diff should override this.
    fn describe_diff(&self, other: &Self) -> String {
        if self == other {
            "states are equal".to_string()
        } else {
            "states differ".to_string()
        }
    }
}

impl<T: Clone + PartialEq> TickState for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    struct Counter(f64);

    #[derive(Clone)]
    struct Axis {
        x: f32,
        jump_edge: bool,
    }

    impl TickInput for Axis {
        fn with_deltas(&self, previous: &Self) -> Self {
            Axis {
                x: self.x,
                jump_edge: self.x > 0.0 && previous.x <= 0.0,
            }
        }
    }

    struct CounterTarget {
        value: f64,
    }

    impl Tickable<Axis, Counter> for CounterTarget {
        fn make_state(&self) -> Counter {
            Counter(self.value)
        }

        fn apply_state(&mut self, state: &Counter) {
            self.value = state.0;
        }

        fn tick(&mut self, dt: DeltaTime, input: &Axis, _tick_info: TickInfo) {
            self.value += input.x as f64 * dt as f64;
        }
    }

    #[test]
    fn make_state_then_apply_state_round_trips() {
        let mut target = CounterTarget { value: 3.5 };
        let snap = target.make_state();
        target.value = 0.0;
        target.apply_state(&snap);
        assert_eq!(target.make_state(), Counter(3.5));
    }

    #[test]
    fn with_deltas_detects_rising_edge() {
        let prev = Axis {
            x: 0.0,
            jump_edge: false,
        };
        let cur = Axis {
            x: 1.0,
            jump_edge: false,
        };
        let enriched = cur.with_deltas(&prev);
        assert!(enriched.jump_edge);
    }

    #[test]
    fn describe_diff_default_reports_equality() {
        assert_eq!(Counter(1.0).describe_diff(&Counter(1.0)), "states are equal");
        assert_eq!(Counter(1.0).describe_diff(&Counter(2.0)), "states differ");
    }
}
