//! Time system for the Timeline
//!
//! Time is a monotonic real number measured in seconds, stored as 64-bit
//! floating point to preserve delta precision over long sessions (spec.md
//! §3). Deltas computed between adjacent times are 32-bit, since a single
//! tick's delta never needs 64-bit range or precision.

/// Logical simulation time, in seconds since some session-defined epoch.
pub type GameTime = f64;

/// A tick's delta time, in seconds.
pub type DeltaTime = f32;

/// Round `t` to the nearest multiple of `1.0 / rate`.
///
/// This is the fixed tick grid used for confirmed state storage and for
/// `current`/`previous` input lookup quantization (spec.md §4.4, §6).
pub fn quantize(t: GameTime, rate: f64) -> GameTime {
    debug_assert!(rate > 0.0, "tick rate must be positive");
    let step = 1.0 / rate;
    (t / step).round() * step
}

/// Whether `t` already lies on the `1/rate` grid, within floating tolerance.
pub fn is_on_grid(t: GameTime, rate: f64, tolerance: GameTime) -> bool {
    (t - quantize(t, rate)).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_snaps_to_grid() {
        assert_eq!(quantize(0.123, 10.0), 0.1);
        assert_eq!(quantize(0.16, 10.0), 0.2);
        assert_eq!(quantize(1.0, 10.0), 1.0);
    }

    #[test]
    fn is_on_grid_detects_exact_and_near_hits() {
        assert!(is_on_grid(0.2, 10.0, 1e-9));
        assert!(is_on_grid(0.2 + 1e-10, 10.0, 1e-6));
        assert!(!is_on_grid(0.25, 10.0, 1e-6));
    }
}
