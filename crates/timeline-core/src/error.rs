//! Error types for timeline-core

use thiserror::Error;

/// Core error type.
///
/// `OutOfRange` is the only programmer-facing failure in the core data
/// model (spec.md §7): every other anomaly a Seek encounters is a warning,
/// not a `Result::Err`, and is reported through the Seek debug sequence
/// instead (see `timeline-netcode::SeekWarning`).
#[derive(Error, Debug)]
pub enum Error {
    #[error("index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
