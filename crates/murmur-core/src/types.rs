//! Shared types for the murmur speech studio.

use serde::Serialize;

/// One stored audio file, reconstructed from filesystem metadata on every
/// listing. Never persisted as a struct.
#[derive(Debug, Clone, Serialize)]
pub struct AudioArtifact {
    /// Base file name including the `.mp3` extension.
    pub name: String,
    /// File size in KiB, rounded to one decimal. Display only.
    pub size_kb: f64,
    /// Modification time as `YYYY-MM-DD HH:MM:SS` local time, used as a
    /// proxy for creation time.
    pub created: String,
}

/// Parameters for one synthesis call. All fields are validated non-empty by
/// the request handler before the gateway is invoked.
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub api_key: String,
    pub model: String,
    pub voice: String,
    pub text: String,
}
