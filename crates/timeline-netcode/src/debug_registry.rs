//! Opt-in, weak, global registry of live Timelines (spec.md §9: "a global
//! all-timelines debug registry, kept opt-in/weak/feature-gated so it can
//! be omitted in production"). Entirely unused unless a caller wraps its
//! `Timeline` in an `Arc<Mutex<_>>` and registers it explicitly - nothing
//! here runs by default.

use std::sync::{Arc, Mutex, OnceLock, Weak};

use crate::Timeline;

type SharedTimeline = Arc<Mutex<Timeline>>;

static REGISTRY: OnceLock<Mutex<Vec<Weak<Mutex<Timeline>>>>> = OnceLock::new();

fn registry() -> &'static Mutex<Vec<Weak<Mutex<Timeline>>>> {
    REGISTRY.get_or_init(|| Mutex::new(Vec::new()))
}

/// Register `timeline` for debug inspection. Holds only a weak reference,
/// so registering never keeps a Timeline alive past its owner dropping it.
pub fn register(timeline: &SharedTimeline) {
    registry().lock().unwrap().push(Arc::downgrade(timeline));
}

/// Every currently-live registered Timeline.
pub fn live_timelines() -> Vec<SharedTimeline> {
    let mut guard = registry().lock().unwrap();
    guard.retain(|weak| weak.strong_count() > 0);
    guard.iter().filter_map(Weak::upgrade).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeline_core::TimelineSettings;

    #[test]
    fn registered_timeline_is_listed_while_alive() {
        let timeline = Arc::new(Mutex::new(Timeline::new(TimelineSettings::default())));
        register(&timeline);
        assert_eq!(live_timelines().len(), 1);
        drop(timeline);
        assert_eq!(live_timelines().len(), 0);
    }
}
