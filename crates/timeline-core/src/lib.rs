//! Timeline Core - foundational types for the deterministic rewindable
//! simulation timeline.
//!
//! This crate provides the vocabulary shared by `timeline-history` (storage)
//! and `timeline-netcode` (the Seek engine):
//! - `GameTime` / `DeltaTime` - the time system
//! - `EntityName` - stable per-entity identity
//! - `Tickable` / `TickInput` / `TickState` - the capability traits a
//!   Timeline requires of its targets
//! - `TickInfo` / `SeekFlags` - what's passed into every tick
//! - `TimelineSettings` - Timeline configuration
//! - `Error` / `Result` - the programmer-facing failure type

mod capability;
mod error;
mod identity;
mod settings;
mod tick_info;
pub mod time;

pub use capability::{Tickable, TickInput, TickState};
pub use error::{Error, Result};
pub use identity::EntityName;
pub use settings::{InputRateConstraint, TimelineSettings};
pub use tick_info::{SeekFlags, TickInfo};
pub use time::{is_on_grid, quantize, DeltaTime, GameTime};
