//! Shared-secret comparison for the admin surface.
//!
//! Comparison is constant-time in the contents of the candidate: after the
//! length check every byte is visited, with no early exit on the first
//! mismatch. The length itself is not treated as secret.

use subtle::ConstantTimeEq;

/// Compares two byte strings without short-circuiting on the first difference.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Returns true only when both the configured secret and the candidate are
/// present, non-empty and equal.
pub fn is_key_valid(configured: Option<&str>, candidate: Option<&str>) -> bool {
    let (Some(expected), Some(candidate)) = (configured, candidate) else {
        return false;
    };
    if expected.is_empty() || candidate.is_empty() {
        return false;
    }
    constant_time_eq(expected.as_bytes(), candidate.as_bytes())
}
