//! Timeline Netcode - the Entity/EventTrack/Seek rewind-and-replay engine
//! (spec.md §4.2-§4.4).
//!
//! This crate provides:
//! - `Entity<T, I, S>` - binds a `Tickable` target to its input/state
//!   tracks (spec.md §4.2)
//! - `EventTrack` - time-keyed callbacks fired during Seek (spec.md §4.3)
//! - `Timeline` - owns the entity set and runs the Seek algorithm: rewind
//!   to the newest shared confirmed state, then replay forward on the
//!   fixed tick grid (spec.md §4.4)
//!
//! # Example
//!
//! ```rust,ignore
//! use timeline_core::{EntityName, SeekFlags, TimelineSettings};
//! use timeline_netcode::{Entity, Timeline};
//!
//! let mut timeline = Timeline::new(TimelineSettings::default());
//! let entity = Entity::new(EntityName::new("player_1"), 0, my_target, 0.0);
//! timeline.insert_entity(entity);
//!
//! // Advance the simulation.
//! timeline.seek(game_time, SeekFlags::empty());
//!
//! // Correct a past state and replay forward from it.
//! timeline.reconcile::<MyTarget, MyInput, MyState>(&name, server_state, server_time);
//! ```

#[cfg(feature = "debug")]
pub mod debug_registry;
pub mod entity;
mod error;
mod event_track;
mod input_pack;
mod timeline;

pub use entity::{Entity, EntityTickOutcome, SeekEntity};
pub use error::{Error, Result};
pub use event_track::{EventCallback, EventTrack};
pub use input_pack::InputPack;
pub use timeline::{SeekReport, SeekWarning, Timeline};
