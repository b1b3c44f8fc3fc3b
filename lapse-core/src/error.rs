//! Error types shared by all store backends.

use thiserror::Error;

/// Errors surfaced by store operations.
///
/// `NotFound` and `TypeMismatch` are expected, recoverable conditions;
/// callers are supposed to branch on them. `Unavailable` means the backend
/// itself failed and is propagated as-is, never retried inside the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key is absent, or present but past its expiration.
    #[error("key not found")]
    NotFound,

    /// The stored value does not match the type the caller asked for.
    #[error("stored value does not match the requested type: {0}")]
    TypeMismatch(String),

    /// The caller's value could not be encoded for storage.
    #[error("value cannot be serialized: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The persistence backend could not be reached or answered with an
    /// I/O-level failure.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns `true` if this error means the key was absent or expired.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }

    /// Returns `true` if this error reports a stored/requested type conflict.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, StoreError::TypeMismatch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_predicate() {
        assert!(StoreError::NotFound.is_not_found());
        assert!(!StoreError::NotFound.is_type_mismatch());
    }

    #[test]
    fn test_type_mismatch_predicate() {
        let err = StoreError::TypeMismatch("expected integer".to_string());
        assert!(err.is_type_mismatch());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = StoreError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }
}
