//! Error taxonomy for the request boundary.
//!
//! Every variant is recovered at the request boundary and rendered as a flash
//! message or a plain status code; nothing is retried anywhere.

use thiserror::Error;

/// Failure reported by the synthesis gateway. Carries the provider's message
/// verbatim; callers surface it to the user unchanged.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SynthesisError(pub String);

/// Everything that can go wrong while handling a request.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required form field was missing or empty. Aborts before the
    /// external call.
    #[error("{0}")]
    Validation(String),

    /// The external speech API call failed. Aborts before any write.
    #[error("speech synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Writing the artifact failed (disk full, permissions, ...).
    #[error("could not save the MP3 file: {0}")]
    Storage(#[from] std::io::Error),

    /// A download request named a path outside the store directory.
    #[error("requested file is outside the audio directory")]
    PathTraversal,
}
