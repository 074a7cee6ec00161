//! `ClockSync` - the follower-side drift-correcting clock (spec.md §4.5).
//!
//! `game_time = local_time + auto_offset`, nudged so that follower inputs
//! consistently arrive at the authority before it reaches the same
//! `game_time`. The correction target is recomputed periodically from a
//! percentile-filtered window of authority-reported offsets, then drained
//! into `auto_offset` gradually (never snapped mid-frame, except as an
//! explicit overflow guard).

use timeline_core::{DeltaTime, GameTime};

use crate::message::{ClientToServer, ServerToClient};
use crate::sample_window::SampleWindow;
use crate::settings::{AdjustmentMode, ClockSyncSettings};

/// Emitted by `ClockSync::advance` when `game_time` crosses a
/// `1 / syncs_per_second` boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSyncTick {
    pub game_time: GameTime,
}

/// The authority side of clock sync: it simply runs on wall/local time and
/// reports the offset between its own game time and the most recently
/// acknowledged client input time (spec.md §4.5: "authority uses wall
/// time").
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorityClock {
    game_time: GameTime,
}

impl AuthorityClock {
    pub fn new() -> Self {
        Self { game_time: 0.0 }
    }

    pub fn game_time(&self) -> GameTime {
        self.game_time
    }

    pub fn advance(&mut self, dt: DeltaTime) {
        self.game_time += dt as f64;
    }

    /// Build the periodic message sent to a follower, given the most
    /// recent client input time this authority has accepted.
    pub fn build_message(&self, last_acked_client_input_time: GameTime) -> ServerToClient {
        ServerToClient {
            server_game_time: self.game_time,
            client_offset: (last_acked_client_input_time - self.game_time) as f32,
        }
    }

    pub fn on_client_update(&self, _msg: ClientToServer) {
        // The authority's own game_time is driven by wall time, not by the
        // follower's reported time; this message exists so the authority
        // can correlate input arrival with the follower's clock if it
        // chooses to (e.g. diagnostics), which is out of this crate's
        // scope.
    }
}

#[derive(Debug, Clone, Copy)]
struct AdjustmentState {
    remaining: GameTime,
    velocity: GameTime,
    started_at: GameTime,
}

/// The follower side: maintains `auto_offset` so `game_time` runs ahead of
/// the authority by enough margin that inputs land before the authority
/// reaches the same `game_time`.
#[derive(Debug, Clone)]
pub struct ClockSync {
    settings: ClockSyncSettings,
    local_time: GameTime,
    game_time: GameTime,
    auto_offset: GameTime,
    adjustment: AdjustmentState,
    time_of_last_recalculation: GameTime,
    time_on_server: GameTime,
    time_of_last_server_update: GameTime,
    window: SampleWindow,
}

impl ClockSync {
    pub fn new(settings: ClockSyncSettings) -> Self {
        Self {
            settings,
            local_time: 0.0,
            game_time: 0.0,
            auto_offset: 0.0,
            adjustment: AdjustmentState {
                remaining: 0.0,
                velocity: 0.0,
                started_at: 0.0,
            },
            time_of_last_recalculation: 0.0,
            time_on_server: 0.0,
            time_of_last_server_update: 0.0,
            window: SampleWindow::new(),
        }
    }

    pub fn game_time(&self) -> GameTime {
        self.game_time
    }

    pub fn auto_offset(&self) -> GameTime {
        self.auto_offset
    }

    pub fn remaining_adjustment(&self) -> GameTime {
        self.adjustment.remaining
    }

    pub fn time_on_server(&self) -> GameTime {
        self.time_on_server
    }

    /// Ingest a periodic update from the authority, recording a sample and
    /// recalculating the correction target if due.
    pub fn on_server_update(&mut self, msg: ServerToClient) {
        self.time_on_server = msg.server_game_time;
        self.time_of_last_server_update = self.local_time;
        self.window
            .push(self.local_time, msg.client_offset, self.settings.sample_period);
        self.maybe_recalculate();
    }

    /// Build the periodic message sent to the authority.
    pub fn build_message(&self) -> ClientToServer {
        ClientToServer {
            game_time: self.game_time,
        }
    }

    /// Advance local and game time by `dt`, draining any pending
    /// correction, and report whether a sync tick boundary was crossed.
    pub fn advance(&mut self, dt: DeltaTime) -> Option<ClockSyncTick> {
        let previous_game_time = self.game_time;

        self.local_time += dt as f64;
        self.drain_adjustment(dt);
        self.game_time = self.local_time + self.auto_offset;

        let sps = self.settings.syncs_per_second;
        let previous_bucket = (previous_game_time * sps).floor() as i64;
        let next_bucket = (self.game_time * sps).floor() as i64;
        if next_bucket != previous_bucket {
            Some(ClockSyncTick {
                game_time: self.game_time,
            })
        } else {
            None
        }
    }

    fn maybe_recalculate(&mut self) {
        let due_at = self.time_of_last_recalculation
            + self.settings.seconds_per_recalculation
            + self.settings.recalculation_cooldown;
        if self.local_time < due_at {
            return;
        }
        self.time_of_last_recalculation = self.local_time;

        // spec.md §4.5 failure mode: no samples means no update at all -
        // `auto_offset` only drifts by whatever correction was already
        // in flight.
        let Some(percentile) = self.window.percentile(self.settings.percentile) else {
            tracing::warn!(
                local_time = self.local_time,
                "clock sync recalculation skipped: no samples in window"
            );
            return;
        };

        self.adjustment.remaining =
            percentile as GameTime - self.settings.additional_prediction_amount;
        self.adjustment.velocity = 0.0;
        self.adjustment.started_at = self.local_time;
    }

    fn drain_adjustment(&mut self, dt: DeltaTime) {
        if self.adjustment.remaining == 0.0 {
            return;
        }
        match self.settings.adjustment_mode {
            AdjustmentMode::Linear => self.drain_linear(dt),
            AdjustmentMode::Curved => self.drain_curved(dt),
        }
    }

    fn drain_linear(&mut self, dt: DeltaTime) {
        let elapsed = self.local_time - self.adjustment.started_at;
        if elapsed >= self.settings.max_adjustment_duration {
            self.auto_offset += self.adjustment.remaining;
            self.adjustment.remaining = 0.0;
            return;
        }
        let max_step = self.settings.linear_speed * dt as f64;
        let step = self.adjustment.remaining.clamp(-max_step, max_step);
        self.auto_offset += step;
        self.adjustment.remaining -= step;
    }

    fn drain_curved(&mut self, dt: DeltaTime) {
        if self.adjustment.remaining.abs() >= 1.0 {
            self.auto_offset += self.adjustment.remaining;
            self.adjustment.remaining = 0.0;
            self.adjustment.velocity = 0.0;
            return;
        }
        let (new_remaining, new_velocity) = critically_damped(
            self.adjustment.remaining,
            self.adjustment.velocity,
            self.settings.curved_damping,
            dt as f64,
        );
        self.auto_offset += self.adjustment.remaining - new_remaining;
        self.adjustment.remaining = new_remaining;
        self.adjustment.velocity = new_velocity;
    }
}

/// Critically-damped spring step toward zero, starting at `x` with
/// `velocity`, stiffness `omega`, over `dt` seconds.
fn critically_damped(x: GameTime, velocity: GameTime, omega: f64, dt: f64) -> (GameTime, GameTime) {
    let exp_term = (-omega * dt).exp();
    let new_x = (x + (velocity + omega * x) * dt) * exp_term;
    let new_velocity = (velocity - omega * (velocity + omega * x) * dt) * exp_term;
    (new_x, new_velocity)
}
