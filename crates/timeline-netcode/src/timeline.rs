//! `Timeline` - owns the entity set and drives the Seek rewind-and-replay
//! algorithm (spec.md §4.4, the heart of the crate).

use indexmap::IndexMap;

use timeline_core::{quantize, is_on_grid, EntityName, GameTime, SeekFlags, TickInfo, TickState, TimelineSettings};

use crate::entity::{Entity, SeekEntity, TIME_TOLERANCE};
use crate::event_track::EventTrack;

const EPSILON: GameTime = 1e-9;

/// A non-fatal condition surfaced during a Seek (spec.md §7). Every variant
/// here is a warning, never a propagated `Result::Err` - the one
/// programmer-facing error (`OutOfRange`) lives in `timeline_core::Error`.
#[derive(Debug, Clone)]
pub enum SeekWarning {
    /// No confirmed state existed at or before the entity's rewind point;
    /// its current in-memory state was captured as a synthesized start.
    NoValidStartState { entity: EntityName, time: GameTime },
    /// The replay loop hit `max_seek_iterations` before reaching the
    /// target and was forced to jump directly to it.
    ReachedMaxIterations { time: GameTime },
    /// A tick's delta exceeded `max_delta_time` and was clamped; time still
    /// advanced to the full step (spec.md §9, preserved as-is).
    DeltaTooBig { entity: EntityName, time: GameTime },
    /// An entity's tick panicked or errored; caught at the tick boundary
    /// and logged, the Seek continues.
    EntityTickException { entity: EntityName, time: GameTime },
}

/// Summary of a completed (or no-op) Seek.
#[derive(Debug, Clone)]
pub struct SeekReport {
    pub iterations_run: u32,
    pub entities_ticked: u64,
    pub warnings: Vec<SeekWarning>,
    pub reached_target: GameTime,
}

impl SeekReport {
    fn noop(playback_time: GameTime) -> Self {
        Self {
            iterations_run: 0,
            entities_ticked: 0,
            warnings: Vec::new(),
            reached_target: playback_time,
        }
    }
}

/// Owns a set of entities, a shared event track, and the Seek algorithm
/// that keeps them in sync with an authoritative or locally-predicted
/// timeline (spec.md §4.4).
pub struct Timeline {
    entities: IndexMap<EntityName, Box<dyn SeekEntity>>,
    events: EventTrack,
    settings: TimelineSettings,
    playback_time: GameTime,
    last_seek_target_time: GameTime,
    debug_paused: bool,
    priority_order: Vec<EntityName>,
    dirty_sort: bool,
}

impl Timeline {
    pub fn new(settings: TimelineSettings) -> Self {
        Self {
            entities: IndexMap::new(),
            events: EventTrack::new(),
            settings,
            playback_time: 0.0,
            last_seek_target_time: 0.0,
            debug_paused: false,
            priority_order: Vec::new(),
            dirty_sort: false,
        }
    }

    pub fn settings(&self) -> &TimelineSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut TimelineSettings {
        &mut self.settings
    }

    pub fn playback_time(&self) -> GameTime {
        self.playback_time
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_debug_paused(&self) -> bool {
        self.debug_paused
    }

    pub fn set_debug_paused(&mut self, paused: bool) {
        self.debug_paused = paused;
    }

    pub fn events_mut(&mut self) -> &mut EventTrack {
        &mut self.events
    }

    /// Insert an entity into the timeline. Smaller `priority` ticks
    /// earlier; ties preserve insertion order (spec.md §3).
    pub fn insert_entity(&mut self, entity: impl SeekEntity + 'static) {
        let name = entity.name().clone();
        self.entities.insert(name, Box::new(entity));
        self.dirty_sort = true;
    }

    pub fn remove_entity(&mut self, name: &EntityName) -> bool {
        let removed = self.entities.shift_remove(name).is_some();
        if removed {
            self.dirty_sort = true;
        }
        removed
    }

    /// Borrow a concrete `Entity<T, I, S>` out of the type-erased store
    /// (spec.md §9: downcast realization of the "small non-generic vtable
    /// abstraction").
    pub fn entity_mut<T: 'static, I: 'static, S: 'static>(
        &mut self,
        name: &EntityName,
    ) -> Option<&mut Entity<T, I, S>> {
        self.entities
            .get_mut(name)?
            .as_any_mut()
            .downcast_mut::<Entity<T, I, S>>()
    }

    fn resort_if_dirty(&mut self) {
        if !self.dirty_sort {
            return;
        }
        let mut order: Vec<EntityName> = self.entities.keys().cloned().collect();
        order.sort_by_key(|name| self.entities.get(name).map(|e| e.priority()).unwrap_or(0));
        self.priority_order = order;
        self.dirty_sort = false;
    }

    /// Run the Seek algorithm to `target` (spec.md §4.4): rewind every
    /// entity to the newest confirmed state at or before `target`, then
    /// replay forward on the fixed tick grid until `target` is reached.
    ///
    /// `playback_time` equals `target` when this returns, regardless of
    /// any warnings recorded along the way (spec.md §7, §8 T2) - so the
    /// caller never deadlocks waiting for a Seek to "really" finish.
    pub fn seek(&mut self, target: GameTime, flags: SeekFlags) -> SeekReport {
        if self.debug_paused {
            return SeekReport::noop(self.playback_time);
        }

        self.resort_if_dirty();

        let mut warnings = Vec::new();
        let rate = self.settings.fixed_tick_rate;

        let t0_raw = self
            .entities
            .values()
            .filter_map(|e| e.confirmed_time_at_or_before(target))
            .fold(f64::INFINITY, f64::min);
        let t0 = if t0_raw.is_finite() {
            quantize(t0_raw, rate)
        } else {
            quantize(self.playback_time, rate)
        };

        for name in &self.priority_order {
            if let Some(entity) = self.entities.get_mut(name) {
                if entity.rewind_to(t0) {
                    warnings.push(SeekWarning::NoValidStartState {
                        entity: name.clone(),
                        time: t0,
                    });
                }
                entity.trim_state_after(t0);
            }
        }

        let dt_tick = self.settings.dt_tick();
        let mut current = t0;
        let mut iterations = 0u32;
        let mut entities_ticked = 0u64;

        while current < target {
            iterations += 1;
            let mut next = quantize(current + dt_tick + EPSILON, rate).min(target);
            let mut can_store_next_state = is_on_grid(next, rate, TIME_TOLERANCE);

            if iterations >= self.settings.max_seek_iterations && next != target {
                next = target;
                can_store_next_state = true;
                warnings.push(SeekWarning::ReachedMaxIterations { time: next });
            }

            self.events.fire_in_range(current, next);

            let is_replaying =
                flags.contains(SeekFlags::TREAT_AS_REPLAY) || next <= self.last_seek_target_time;
            let tick_info = TickInfo {
                time: next,
                is_whole_tick: can_store_next_state,
                is_replaying,
                seek_flags: flags,
            };

            for name in &self.priority_order {
                if let Some(entity) = self.entities.get_mut(name) {
                    let outcome = entity.tick_entity(next, current, &self.settings, tick_info);
                    entities_ticked += 1;
                    if outcome.delta_clamped {
                        warnings.push(SeekWarning::DeltaTooBig {
                            entity: name.clone(),
                            time: next,
                        });
                    }
                    if outcome.tick_failed {
                        warnings.push(SeekWarning::EntityTickException {
                            entity: name.clone(),
                            time: next,
                        });
                    }
                }
            }

            if can_store_next_state && !flags.contains(SeekFlags::DONT_CONFIRM) {
                for name in &self.priority_order {
                    if let Some(entity) = self.entities.get_mut(name) {
                        entity.store_current_state_for_seek(next);
                    }
                }
            }

            current = next;
            self.playback_time = current;
            self.last_seek_target_time = next;
        }

        // Guaranteed terminal regardless of how the loop above exited
        // (spec.md §7: "on any error, playback_time still equals the Seek
        // target on return").
        self.playback_time = target;

        let t_min = self.playback_time - self.settings.history_length;
        let t_max = self.playback_time + self.settings.history_length;
        for entity in self.entities.values_mut() {
            entity.trim_history(t_min, t_max);
        }
        self.events.trim_before_except_latest(t_min);
        self.events.trim_after(t_max);

        if flags.contains(SeekFlags::NO_DEBUG_SEQUENCE) {
            warnings.clear();
        } else if self.settings.debug_log_seek_warnings {
            for warning in &warnings {
                tracing::warn!(?warning, "seek warning");
            }
        }

        SeekReport {
            iterations_run: iterations,
            entities_ticked,
            warnings,
            reached_target: self.playback_time,
        }
    }

    /// Apply a corrected state at `time` to `name`'s track, then re-run
    /// Seek to the current playback time with `TREAT_AS_REPLAY` set
    /// (spec.md §4.2, §4.4).
    pub fn reconcile<T: 'static, I: 'static, S: TickState + 'static>(
        &mut self,
        name: &EntityName,
        state: S,
        time: GameTime,
    ) -> SeekReport {
        let target = self.playback_time;
        let always_reconcile = self.settings.always_reconcile;
        if let Some(entity) = self.entity_mut::<T, I, S>(name) {
            entity.store_state_at(state, time, always_reconcile);
        }
        self.seek(target, SeekFlags::TREAT_AS_REPLAY)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use timeline_core::{DeltaTime, TickInput, Tickable};

    #[derive(Clone, PartialEq, Debug)]
    struct Counter {
        value: f64,
    }

    #[derive(Clone, Default)]
    struct Axis {
        x: f32,
    }

    impl TickInput for Axis {
        fn with_deltas(&self, _previous: &Self) -> Self {
            self.clone()
        }
    }

    struct CounterTarget {
        value: f64,
    }

    impl Tickable<Axis, Counter> for CounterTarget {
        fn make_state(&self) -> Counter {
            Counter { value: self.value }
        }

        fn apply_state(&mut self, state: &Counter) {
            self.value = state.value;
        }

        fn tick(&mut self, dt: DeltaTime, input: &Axis, _tick_info: TickInfo) {
            self.value += input.x as f64 * dt as f64;
        }
    }

    fn settings() -> TimelineSettings {
        TimelineSettings {
            fixed_tick_rate: 10.0,
            max_tick_rate: 10.0,
            max_seek_iterations: 200,
            ..TimelineSettings::default()
        }
    }

    /// S1: a simple forward-ticking counter at rate 10 driven by constant
    /// input should end up at `value == input.x * elapsed`.
    #[test]
    fn s1_simple_forward_tick_counter() {
        let mut timeline = Timeline::new(settings());
        let name = EntityName::new("counter");
        let mut entity = Entity::new(name.clone(), 0, CounterTarget { value: 0.0 }, 0.0);
        entity
            .insert_input(Axis { x: 1.0 }, 0.0, timeline.settings())
            .unwrap();
        timeline.insert_entity(entity);

        let report = timeline.seek(1.0, SeekFlags::empty());
        assert_eq!(report.reached_target, 1.0);

        let entity = timeline.entity_mut::<CounterTarget, Axis, Counter>(&name).unwrap();
        assert!((entity.target().value - 1.0).abs() < 1e-6);
    }

    /// S5: with a tight `max_seek_iterations`, Seek still reaches the
    /// target (forced jump), and records the warning.
    #[test]
    fn s5_max_iterations_forces_jump_to_target() {
        let mut settings = settings();
        settings.max_seek_iterations = 3;
        let mut timeline = Timeline::new(settings);
        let name = EntityName::new("counter");
        let entity = Entity::new(name.clone(), 0, CounterTarget { value: 0.0 }, 0.0);
        timeline.insert_entity(entity);

        let report = timeline.seek(1.0, SeekFlags::empty());
        assert_eq!(report.reached_target, 1.0);
        assert_eq!(report.iterations_run, 3);
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, SeekWarning::ReachedMaxIterations { .. })));
    }

    /// T2: playback_time always equals the Seek target on return, even
    /// when nothing is rewindable (degenerate entity-less timeline).
    #[test]
    fn t2_seek_is_terminal_with_no_entities() {
        let mut timeline = Timeline::new(settings());
        let report = timeline.seek(5.0, SeekFlags::empty());
        assert_eq!(report.reached_target, 5.0);
        assert_eq!(timeline.playback_time(), 5.0);
    }

    /// T3: states stored during replay land on the confirmation grid.
    #[test]
    fn t3_stored_states_land_on_confirmation_grid() {
        let mut timeline = Timeline::new(settings());
        let name = EntityName::new("counter");
        let entity = Entity::new(name.clone(), 0, CounterTarget { value: 0.0 }, 0.0);
        timeline.insert_entity(entity);
        timeline.seek(0.53, SeekFlags::empty());

        let entity = timeline.entity_mut::<CounterTarget, Axis, Counter>(&name).unwrap();
        for (t, _) in entity.state_track().iter() {
            assert!(is_on_grid(t, 10.0, 1e-6) || (t - 0.53).abs() < 1e-9);
        }
    }

    /// T5: replaying the same target twice from the same starting point
    /// is deterministic.
    #[test]
    fn t5_deterministic_replay() {
        let mut timeline = Timeline::new(settings());
        let name = EntityName::new("counter");
        let mut entity = Entity::new(name.clone(), 0, CounterTarget { value: 0.0 }, 0.0);
        entity
            .insert_input(Axis { x: 2.0 }, 0.0, timeline.settings())
            .unwrap();
        timeline.insert_entity(entity);

        timeline.seek(1.0, SeekFlags::empty());
        let first = timeline
            .entity_mut::<CounterTarget, Axis, Counter>(&name)
            .unwrap()
            .target()
            .value;

        // Re-seek to an earlier time, then forward again: should land on
        // the same value.
        timeline.seek(0.3, SeekFlags::empty());
        timeline.seek(1.0, SeekFlags::TREAT_AS_REPLAY);
        let second = timeline
            .entity_mut::<CounterTarget, Axis, Counter>(&name)
            .unwrap()
            .target()
            .value;

        assert!((first - second).abs() < 1e-6);
    }

    /// S3-flavored: reconciling a past state re-derives forward history.
    #[test]
    fn reconcile_applies_correction_and_replays_forward() {
        let mut timeline = Timeline::new(settings());
        let name = EntityName::new("counter");
        let mut entity = Entity::new(name.clone(), 0, CounterTarget { value: 0.0 }, 0.0);
        entity
            .insert_input(Axis { x: 1.0 }, 0.0, timeline.settings())
            .unwrap();
        timeline.insert_entity(entity);

        timeline.seek(1.0, SeekFlags::empty());
        let report = timeline.reconcile::<CounterTarget, Axis, Counter>(
            &name,
            Counter { value: 5.0 },
            0.5,
        );
        assert_eq!(report.reached_target, 1.0);

        let entity = timeline.entity_mut::<CounterTarget, Axis, Counter>(&name).unwrap();
        // 0.5s of corrected state plus 0.5s of further input-driven ticks.
        assert!((entity.target().value - 5.5).abs() < 1e-3);
    }

    #[test]
    fn debug_paused_seek_is_a_noop() {
        let mut timeline = Timeline::new(settings());
        timeline.set_debug_paused(true);
        let report = timeline.seek(10.0, SeekFlags::empty());
        assert_eq!(report.iterations_run, 0);
        assert_eq!(timeline.playback_time(), 0.0);
    }

    struct WriterTarget {
        value: f64,
        shared: Rc<RefCell<f64>>,
    }

    impl Tickable<Axis, Counter> for WriterTarget {
        fn make_state(&self) -> Counter {
            Counter { value: self.value }
        }

        fn apply_state(&mut self, state: &Counter) {
            self.value = state.value;
        }

        fn tick(&mut self, dt: DeltaTime, input: &Axis, _tick_info: TickInfo) {
            self.value += input.x as f64 * dt as f64;
            *self.shared.borrow_mut() = self.value;
        }
    }

    struct ReaderTarget {
        value: f64,
        shared: Rc<RefCell<f64>>,
    }

    impl Tickable<Axis, Counter> for ReaderTarget {
        fn make_state(&self) -> Counter {
            Counter { value: self.value }
        }

        fn apply_state(&mut self, state: &Counter) {
            self.value = state.value;
        }

        fn tick(&mut self, _dt: DeltaTime, _input: &Axis, _tick_info: TickInfo) {
            // Reads entity A's state through a shared external handle
            // rather than through the Timeline, per spec.md §9's
            // cross-entity access model.
            self.value = *self.shared.borrow();
        }
    }

    /// S4/T4: a lower-priority entity reads a higher-priority entity's
    /// freshly-ticked value through a shared external handle within the
    /// same Seek sub-step. This only works because entities tick in
    /// priority order and state storage happens in its own pass *after*
    /// every entity has ticked (spec.md §4.4 rationale) - if storage were
    /// interleaved per-entity, or ticks ran out of priority order, the
    /// reader would observe a stale or partially-updated value.
    #[test]
    fn s4_cross_entity_ordering_via_shared_handle() {
        let mut timeline = Timeline::new(settings());
        let shared = Rc::new(RefCell::new(0.0));

        let writer_name = EntityName::new("writer");
        let mut writer = Entity::new(
            writer_name.clone(),
            0,
            WriterTarget {
                value: 0.0,
                shared: shared.clone(),
            },
            0.0,
        );
        writer
            .insert_input(Axis { x: 1.0 }, 0.0, timeline.settings())
            .unwrap();
        timeline.insert_entity(writer);

        let reader_name = EntityName::new("reader");
        let reader = Entity::new(
            reader_name.clone(),
            1,
            ReaderTarget {
                value: -1.0,
                shared: shared.clone(),
            },
            0.0,
        );
        timeline.insert_entity(reader);

        timeline.seek(0.1, SeekFlags::empty());

        let writer_value = timeline
            .entity_mut::<WriterTarget, Axis, Counter>(&writer_name)
            .unwrap()
            .target()
            .value;
        let reader_value = timeline
            .entity_mut::<ReaderTarget, Axis, Counter>(&reader_name)
            .unwrap()
            .target()
            .value;

        assert!((writer_value - 0.1).abs() < 1e-6);
        assert!((reader_value - writer_value).abs() < 1e-6);
    }
}
