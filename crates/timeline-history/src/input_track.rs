//! `InputTrack<I>` - a `Track` specialized to hold input entries (spec.md
//! §3). Adds no new invariants over `Track<I>`.

use std::ops::{Deref, DerefMut};

use crate::Track;

/// Per-entity history of timestamped inputs.
#[derive(Debug, Clone, Default)]
pub struct InputTrack<I>(Track<I>);

impl<I> InputTrack<I> {
    /// Create an empty input track.
    pub fn new() -> Self {
        Self(Track::new())
    }
}

impl<I> Deref for InputTrack<I> {
    type Target = Track<I>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<I> DerefMut for InputTrack<I> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
