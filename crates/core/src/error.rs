//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, ownership, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. missing client name, empty item list).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated (e.g. mutating a finalized document).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found, or belongs to another owner.
    #[error("not found")]
    NotFound,

    /// The resource exists but the acting owner may not mutate it.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A conflict occurred (e.g. stale version, duplicate catalog entry).
    #[error("conflict: {0}")]
    Conflict(String),

    /// No authenticated principal at the domain boundary.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

/// Require a non-blank string, returning it trimmed.
pub fn require_text(value: Option<&str>, field: &str) -> DomainResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DomainError::validation(format!("{field} is required"))),
    }
}

/// Require a finite, strictly positive number.
pub fn require_positive(value: Option<f64>, field: &str) -> DomainResult<f64> {
    match value {
        None => Err(DomainError::validation(format!("{field} is required"))),
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(_) => Err(DomainError::validation(format!(
            "{field} must be greater than 0"
        ))),
    }
}

/// Normalise optional free text: blank becomes `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text(Some("  Asha "), "client name").unwrap(), "Asha");
        assert_eq!(
            require_text(Some("   "), "client name").unwrap_err(),
            DomainError::validation("client name is required")
        );
        assert!(require_text(None, "client name").is_err());
    }

    #[test]
    fn require_positive_rejects_zero_negative_and_nan() {
        assert_eq!(require_positive(Some(2.5), "length").unwrap(), 2.5);
        assert!(require_positive(Some(0.0), "length").is_err());
        assert!(require_positive(Some(-1.0), "length").is_err());
        assert!(require_positive(Some(f64::NAN), "length").is_err());
        assert!(require_positive(Some(f64::INFINITY), "length").is_err());
        assert_eq!(
            require_positive(None, "width").unwrap_err(),
            DomainError::validation("width is required")
        );
    }

    #[test]
    fn optional_text_blank_is_none() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" x ".into())), Some("x".into()));
        assert_eq!(optional_text(None), None);
    }
}
