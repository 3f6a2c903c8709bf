//! murmur-core — Pure types and filename handling.
//!
//! No async runtime, no I/O. The only nondeterminism is the sanitizer's
//! random fallback identifier.

pub mod sanitize;
pub mod types;
