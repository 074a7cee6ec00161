//! `TickInfo` and the composable `SeekFlags` bitset (spec.md §4.4, §6).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::time::GameTime;

bitflags! {
    /// Composable flags controlling how a single Seek behaves (spec.md
    /// §4.4).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SeekFlags: u32 {
        /// Ticks use `current_input` as its own previous; no edge-triggered
        /// signals derived.
        const IGNORE_DELTAS = 1 << 0;
        /// No states are written during the seek (read-only scrub).
        const DONT_CONFIRM = 1 << 1;
        /// Forces `is_replaying = true` regardless of time comparison.
        const TREAT_AS_REPLAY = 1 << 2;
        /// Do not record the per-op debug log.
        const NO_DEBUG_SEQUENCE = 1 << 3;
    }
}

impl Default for SeekFlags {
    fn default() -> Self {
        SeekFlags::empty()
    }
}

/// Passed into every tick (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickInfo {
    /// The time this tick advances to.
    pub time: GameTime,
    /// True if this tick lands on the fixed confirmation grid.
    pub is_whole_tick: bool,
    /// True if this tick is replaying previously-played time (so the
    /// target should suppress one-shot sound/VFX).
    pub is_replaying: bool,
    /// The seek flags in effect for the Seek this tick belongs to.
    pub seek_flags: SeekFlags,
}

impl TickInfo {
    /// `!is_replaying && is_whole_tick`: this tick is confirming new,
    /// forward-moving simulation state (spec.md §6).
    pub fn is_confirming_forward(&self) -> bool {
        !self.is_replaying && self.is_whole_tick
    }
}
