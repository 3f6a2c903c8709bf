//! murmur-lib — Speech studio engine.
//!
//! Artifact store, synthesis gateway, and the HTTP surface. Depends on
//! murmur-core for pure types and filename handling.

pub mod error;
pub mod server;
pub mod store;
pub mod synth;

// Re-export murmur-core for convenience
pub use murmur_core;
