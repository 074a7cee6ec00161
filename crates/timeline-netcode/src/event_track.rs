//! `EventTrack` - a track of callbacks keyed by playback time (spec.md
//! §4.3). Built directly on `timeline_history::Track<Vec<EventCallback>>`
//! rather than a bespoke structure, reusing the one ordered time-keyed
//! primitive the rest of the crate is built on.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use timeline_core::GameTime;
use timeline_history::Track;

use crate::entity::TIME_TOLERANCE;

/// A callback scheduled against a playback time. `Rc<RefCell<_>>` rather
/// than a plain `Box` because the track's `trim_before_except_latest`
/// needs `Clone`, and events are fired (but never consumed) during replay
/// (spec.md §5: single-threaded, cooperative - no `Send` needed).
pub type EventCallback = Rc<RefCell<dyn FnMut()>>;

/// Events scheduled at the same (tolerance-matched) instant are composed
/// additively: concatenated in insertion order (spec.md §9, the explicitly
/// resolved ambiguity for same-time event composition).
#[derive(Default)]
pub struct EventTrack(Track<Vec<EventCallback>>);

impl EventTrack {
    pub fn new() -> Self {
        Self(Track::new())
    }

    /// Schedule `cb` to fire at `time`. If another event already occupies
    /// the same (tolerance-matched) slot, `cb` is appended after it.
    pub fn call_event(&mut self, time: GameTime, cb: EventCallback) {
        if let Some(idx) = self.0.index_at(time, TIME_TOLERANCE) {
            if let Ok(bucket) = self.0.get_mut(idx) {
                bucket.push(cb);
                return;
            }
        }
        self.0.set(time, vec![cb], TIME_TOLERANCE);
    }

    /// Fire every event scheduled in `[from, to_exclusive)`, oldest first,
    /// and within a time slot in insertion order. Events are not removed -
    /// they refire identically on every Seek that crosses their time,
    /// which is what makes replay deterministic (spec.md §8 T5).
    pub fn fire_in_range(&mut self, from: GameTime, to_exclusive: GameTime) {
        let times: Vec<GameTime> = self
            .0
            .iter_oldest_first()
            .filter(|(t, _)| *t >= from && *t < to_exclusive)
            .map(|(t, _)| t)
            .collect();
        for t in times {
            let Some(idx) = self.0.index_at(t, TIME_TOLERANCE) else {
                continue;
            };
            let Ok(bucket) = self.0.get(idx) else {
                continue;
            };
            let callbacks = bucket.clone();
            for cb in callbacks {
                (cb.borrow_mut())();
            }
        }
    }
}

impl Deref for EventTrack {
    type Target = Track<Vec<EventCallback>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for EventTrack {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_at_same_time_compose_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut events = EventTrack::new();

        let log_a = log.clone();
        events.call_event(1.0, Rc::new(RefCell::new(move || log_a.borrow_mut().push('a'))));
        let log_b = log.clone();
        events.call_event(1.0, Rc::new(RefCell::new(move || log_b.borrow_mut().push('b'))));

        events.fire_in_range(0.0, 2.0);
        assert_eq!(*log.borrow(), vec!['a', 'b']);
    }

    #[test]
    fn fire_in_range_only_fires_within_window() {
        let count = Rc::new(RefCell::new(0));
        let mut events = EventTrack::new();
        let c1 = count.clone();
        events.call_event(0.5, Rc::new(RefCell::new(move || *c1.borrow_mut() += 1)));
        let c2 = count.clone();
        events.call_event(5.0, Rc::new(RefCell::new(move || *c2.borrow_mut() += 1)));

        events.fire_in_range(0.0, 1.0);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn events_refire_on_repeated_range_overlap() {
        let count = Rc::new(RefCell::new(0));
        let mut events = EventTrack::new();
        let c1 = count.clone();
        events.call_event(0.5, Rc::new(RefCell::new(move || *c1.borrow_mut() += 1)));

        events.fire_in_range(0.0, 1.0);
        events.fire_in_range(0.0, 1.0);
        assert_eq!(*count.borrow(), 2);
    }
}
