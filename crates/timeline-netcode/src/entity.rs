//! `Entity` - binds a Tickable target to its input/state tracks (spec.md
//! §4.2).

use std::any::Any;

use timeline_core::{
    quantize, DeltaTime, EntityName, GameTime, InputRateConstraint, SeekFlags, TickInfo,
    TickInput, TickState, Tickable, TimelineSettings,
};
use timeline_history::{InputTrack, StateTrack};

use crate::input_pack::InputPack;
use crate::{Error, Result};

/// Tolerance used for exact-time track lookups (state confirmation grid,
/// event composition). Distinct from the caller-supplied rate epsilon,
/// which scales with tick rate.
pub(crate) const TIME_TOLERANCE: GameTime = 1e-9;

/// A Tickable target plus its input and state history (spec.md §4.2).
pub struct Entity<T, I, S> {
    name: EntityName,
    priority: i32,
    target: T,
    input_track: InputTrack<I>,
    state_track: StateTrack<S>,
}

impl<T, I, S> Entity<T, I, S>
where
    T: Tickable<I, S>,
    I: TickInput,
    S: TickState,
{
    /// Create a new entity; an initial state is captured immediately at
    /// `initial_time` (spec.md §3: "an entity always has at least one
    /// state after creation").
    pub fn new(name: EntityName, priority: i32, target: T, initial_time: GameTime) -> Self {
        let mut entity = Self {
            name,
            priority,
            target,
            input_track: InputTrack::new(),
            state_track: StateTrack::new(),
        };
        entity.store_current_state(initial_time, false, false);
        entity
    }

    pub fn name(&self) -> &EntityName {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn input_track(&self) -> &InputTrack<I> {
        &self.input_track
    }

    pub fn state_track(&self) -> &StateTrack<S> {
        &self.state_track
    }

    pub fn latest_input_time(&self) -> Option<GameTime> {
        self.input_track.latest_time()
    }

    pub fn latest_state_time(&self) -> Option<GameTime> {
        self.state_track.latest_time()
    }

    /// Insert an input honoring the configured max-input-rate policy
    /// (spec.md §3, §4.2).
    pub fn insert_input(&mut self, input: I, time: GameTime, settings: &TimelineSettings) -> Result<()> {
        match settings.max_tick_rate_constraint {
            InputRateConstraint::Quantized => {
                let bucket = quantize(time, settings.max_tick_rate);
                if self.input_track.index_at(bucket, TIME_TOLERANCE).is_some() {
                    // duplicate insert in the same bucket is dropped, not an error
                    return Ok(());
                }
                self.input_track.set(bucket, input, TIME_TOLERANCE);
                Ok(())
            }
            InputRateConstraint::Variable => {
                let min_spacing = 1.0 / settings.max_tick_rate - EPSILON;
                if let Some(last) = self.input_track.latest_time() {
                    if time - last < min_spacing {
                        return Err(Error::InputRateRejected {
                            time,
                            last_accepted: last,
                        });
                    }
                }
                self.input_track.set(time, input, TIME_TOLERANCE);
                Ok(())
            }
        }
    }

    /// Insert an input after quantizing `time` to `1 / max_tick_rate`
    /// first (spec.md §4.2). Unlike `insert_input`, this always writes —
    /// the caller has already taken responsibility for rate spacing by
    /// quantizing.
    pub fn insert_quantized_input(&mut self, input: I, time: GameTime, settings: &TimelineSettings) {
        let bucket = quantize(time, settings.max_tick_rate);
        self.input_track.set(bucket, input, TIME_TOLERANCE);
    }

    /// Apply a batch of timestamped inputs, oldest first, so that the most
    /// recent input wins when two pack entries land on the same slot
    /// (spec.md §4.2, §6).
    pub fn insert_input_pack(&mut self, pack: InputPack<I>) {
        for idx in (0..pack.len()).rev() {
            self.input_track
                .set(pack.times[idx], pack.inputs[idx].clone(), TIME_TOLERANCE);
        }
    }

    /// Capture the target's current state and write it into the state
    /// track at `time` (spec.md §4.2).
    pub fn store_current_state(&mut self, time: GameTime, clear_future: bool, reapply: bool) {
        let state = self.target.make_state();
        self.state_track.set(time, state.clone(), TIME_TOLERANCE);
        if clear_future {
            self.state_track.trim_after(time);
        }
        if reapply {
            self.target.apply_state(&state);
        }
    }

    /// Write a state correction; trims the state track strictly *after*
    /// `time` (never at it, spec.md §9) when it differs from what's
    /// already stored there, or unconditionally when `always_reconcile` is
    /// set. Returns whether a trim (and thus a future re-derivation) was
    /// triggered.
    pub fn store_state_at(&mut self, state: S, time: GameTime, always_reconcile: bool) -> bool {
        let differs = match self.state_track.index_at(time, TIME_TOLERANCE) {
            Some(idx) => self
                .state_track
                .get(idx)
                .map(|existing| existing != &state)
                .unwrap_or(true),
            None => true,
        };
        self.state_track.set(time, state, TIME_TOLERANCE);
        if differs || always_reconcile {
            self.state_track.trim_after(time);
            true
        } else {
            false
        }
    }

    /// Tick the target once, deriving edge-triggered input signals from
    /// `previous_input_index` when it's supplied and differs from
    /// `current_input_index` (spec.md §4.2). When no previous index is
    /// given, or it names the same entry, the current input is used
    /// as-is (no deltas).
    pub fn generic_tick(
        &mut self,
        dt: DeltaTime,
        current_input_index: Option<usize>,
        previous_input_index: Option<usize>,
        tick_info: TickInfo,
    ) -> Result<()>
    where
        I: Default,
    {
        let current = match current_input_index {
            Some(idx) => self.input_track.get(idx)?.clone(),
            None => I::default(),
        };
        let input = match previous_input_index {
            Some(prev_idx) if Some(prev_idx) != current_input_index => {
                let previous = self.input_track.get(prev_idx)?.clone();
                current.with_deltas(&previous)
            }
            _ => current,
        };
        self.target.tick(dt, &input, tick_info);
        Ok(())
    }
}

const EPSILON: GameTime = 1e-9;

/// Object-safe view of an `Entity<T, I, S>` for the Timeline to drive a
/// heterogeneous collection of entities without naming their concrete
/// `(T, I, S)` parameters (spec.md §9: "a small non-generic vtable
/// abstraction the Timeline owns"). Downcast back to the concrete `Entity`
/// via `as_any_mut` when a caller needs a type-specific operation (e.g.
/// `store_state_at`).
pub trait SeekEntity: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn name(&self) -> &EntityName;
    fn priority(&self) -> i32;

    /// The confirmed-state time at or before `t`, if any.
    fn confirmed_time_at_or_before(&self, t: GameTime) -> Option<GameTime>;

    /// Apply the confirmed state at or before `t0`; if none exists,
    /// synthesize one from the target's current state. Returns `true`
    /// when a state had to be synthesized (`NoValidStartState`).
    fn rewind_to(&mut self, t0: GameTime) -> bool;

    /// Trim the state track to entries at or before `t0`.
    fn trim_state_after(&mut self, t0: GameTime);

    /// Tick this entity from `current` to `next`. Returns whether the
    /// delta had to be clamped and whether the tick failed (panicked or
    /// errored) — both are non-fatal per spec.md §7.
    fn tick_entity(
        &mut self,
        next: GameTime,
        current: GameTime,
        settings: &TimelineSettings,
        tick_info: TickInfo,
    ) -> EntityTickOutcome;

    /// Store the target's current state at `next` (post-tick
    /// confirmation, spec.md §4.4 "storage-after-tick").
    fn store_current_state_for_seek(&mut self, next: GameTime);

    /// History cleanup on both tracks after a Seek completes.
    fn trim_history(&mut self, t_min: GameTime, t_max: GameTime);
}

/// Outcome of a single entity tick within a Seek replay step.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityTickOutcome {
    pub delta_clamped: bool,
    pub tick_failed: bool,
}

impl<T, I, S> SeekEntity for Entity<T, I, S>
where
    T: Tickable<I, S> + 'static,
    I: TickInput + Default + 'static,
    S: TickState + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn name(&self) -> &EntityName {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn confirmed_time_at_or_before(&self, t: GameTime) -> Option<GameTime> {
        let idx = self.state_track.closest_index_before_inclusive(t)?;
        self.state_track.time_at(idx).ok()
    }

    fn rewind_to(&mut self, t0: GameTime) -> bool {
        if let Some(idx) = self.state_track.closest_index_before_inclusive(t0) {
            if let Ok(state) = self.state_track.get(idx).map(|s| s.clone()) {
                self.target.apply_state(&state);
                return false;
            }
        }
        let state = self.target.make_state();
        self.state_track.set(t0, state, TIME_TOLERANCE);
        true
    }

    fn trim_state_after(&mut self, t0: GameTime) {
        self.state_track.trim_after(t0);
    }

    fn tick_entity(
        &mut self,
        next: GameTime,
        current: GameTime,
        settings: &TimelineSettings,
        tick_info: TickInfo,
    ) -> EntityTickOutcome {
        let dt_tick = settings.dt_tick();
        let rate = settings.fixed_tick_rate;
        let current_grid = quantize(current, rate);
        let previous_grid = quantize(current - (dt_tick - EPSILON), rate);

        let current_idx = self
            .input_track
            .closest_index_before_or_earliest_inclusive(current_grid);
        let previous_idx = if tick_info.seek_flags.contains(SeekFlags::IGNORE_DELTAS) {
            current_idx
        } else {
            self.input_track
                .closest_index_before_or_earliest_inclusive(previous_grid)
        };

        let raw_delta = (next - current) as f32;
        let delta_clamped = raw_delta.abs() > settings.max_delta_time;
        let dt = if delta_clamped {
            raw_delta.signum() * settings.max_delta_time
        } else {
            raw_delta
        };

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.generic_tick(dt, current_idx, previous_idx, tick_info)
        }));

        let tick_failed = !matches!(result, Ok(Ok(())));
        EntityTickOutcome {
            delta_clamped,
            tick_failed,
        }
    }

    fn store_current_state_for_seek(&mut self, next: GameTime) {
        self.store_current_state(next, false, false);
    }

    fn trim_history(&mut self, t_min: GameTime, t_max: GameTime) {
        self.state_track.trim_before_except_latest(t_min);
        self.state_track.trim_after(t_max);
        self.input_track.trim_before_except_latest(t_min);
        self.input_track.trim_after(t_max);
    }
}
