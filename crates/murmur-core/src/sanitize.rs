//! Filename sanitization — free-form user input to a filesystem-safe token.

use uuid::Uuid;

/// Reduce an arbitrary string to a token safe to use as a base filename.
///
/// Keeps ASCII letters, digits, `-` and `_` in their original order and drops
/// everything else. If nothing survives, a random UUID is substituted so the
/// caller always gets a usable, unique name.
///
/// No length cap is enforced; pathologically long inputs are left for the
/// filesystem to reject.
pub fn sanitize_file_name(input: &str) -> String {
    let token: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if token.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        token
    }
}
