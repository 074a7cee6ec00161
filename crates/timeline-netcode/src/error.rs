//! Error types for timeline-netcode

use thiserror::Error;

/// Netcode error type.
#[derive(Debug, Error)]
pub enum Error {
    /// An input was rejected by the configured input-rate policy (spec.md
    /// §3): either the `Quantized` bucket was already occupied, or
    /// `Variable` spacing was violated.
    #[error("input at time {time} rejected by rate policy (last accepted at {last_accepted})")]
    InputRateRejected { time: f64, last_accepted: f64 },

    /// A track-level failure (out-of-range index, etc.) propagated up
    /// from `timeline-core`/`timeline-history`.
    #[error(transparent)]
    Core(#[from] timeline_core::Error),
}

/// Result type for netcode operations.
pub type Result<T> = std::result::Result<T, Error>;
