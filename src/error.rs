//! Error types for the sweep pipeline.
//!
//! Three failure families with different propagation rules:
//! - [`EncodeError`] — a payload could not be turned into a base image. The
//!   batch runner skips that job and keeps going.
//! - [`DecodeError`] — the oracle failed or panicked for a single frame. The
//!   sweep counts it as zero results for that angle and keeps going.
//! - [`SweepError`] — everything that aborts a sweep: bad input buffers,
//!   transform failures, invalid configuration.

use serde::Serialize;

/// Failure producing a base image from a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("symbology `{0}` is not supported by this encoder")]
    Unsupported(String),

    #[error("payload rejected: {0}")]
    Payload(String),
}

/// Failure of a single decode call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DecodeError {
    #[error("decoder backend failed: {0}")]
    Backend(String),

    #[error("decode did not finish within {0} ms")]
    Timeout(u64),

    #[error("decode worker hung up")]
    Disconnected,

    /// The oracle panicked. Carries the panic message when it was a string.
    #[error("decoder panicked: {0}")]
    Panicked(String),

    /// Too many earlier decodes timed out and are still running; this frame
    /// was not handed to the oracle at all.
    #[error("{0} timed-out decode(s) still running, frame skipped")]
    Stalled(usize),
}

/// Errors that abort a sweep or a batch.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("invalid image buffer: {0}")]
    InvalidImage(String),

    /// Noise or rotation failed. Never expected for valid inputs.
    #[error("transform failed: {0}")]
    Transform(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("failed to start decode thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl From<SweepError> for String {
    fn from(error: SweepError) -> Self {
        error.to_string()
    }
}
