//! Timeline ClockSync - cross-participant clock drift correction (spec.md
//! §4.5).
//!
//! Unlike `timeline-history`/`timeline-netcode`, this module has no notion
//! of rewind or entities: it exists purely to keep a follower's
//! `game_time` running just far enough ahead of an authority's wall clock
//! that the follower's inputs consistently arrive before the authority
//! reaches the same `game_time`.
//!
//! - `AuthorityClock` - the trivial wall-time side
//! - `ClockSync` - the follower side: percentile-filtered drift estimation
//!   plus gradual (never-jarring, except as an overflow guard)
//!   `auto_offset` correction
//! - `ServerToClient` / `ClientToServer` - the unreliable wire messages
//!   exchanged between them

mod clock_sync;
mod message;
mod sample_window;
mod settings;

pub use clock_sync::{AuthorityClock, ClockSync, ClockSyncTick};
pub use message::{ClientToServer, ServerToClient};
pub use settings::{AdjustmentMode, ClockSyncSettings};
