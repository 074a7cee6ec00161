//! Wire messages exchanged between authority and follower clocks (spec.md
//! §6). Both are sent over an unreliable channel - losses are expected and
//! absorbed by the follower's sample window.

use serde::{Deserialize, Serialize};
use timeline_core::GameTime;

/// Authority -> follower, periodic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServerToClient {
    pub server_game_time: GameTime,
    /// `last_acked_client_input_time - server_game_time`, computed by the
    /// authority from whatever client input it most recently applied.
    pub client_offset: f32,
}

/// Follower -> authority, periodic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientToServer {
    pub game_time: GameTime,
}
