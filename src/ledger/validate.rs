//! Local checks applied before anything reaches the ledger.

use thiserror::Error;

/// Longest offer lifetime accepted, in minutes (one week).
pub const MAX_OFFER_DURATION_MINUTES: u32 = 7 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("{0} must be greater than 0")]
    NotPositive(&'static str),

    #[error("duration must be between 1 and {max} minutes")]
    Duration { max: u32 },
}

impl ValidationError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing(field)
            | ValidationError::NotFinite(field)
            | ValidationError::NotPositive(field) => field,
            ValidationError::Duration { .. } => "duration",
        }
    }
}

/// Non-empty after trimming whitespace.
pub fn require_id(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(())
}

/// Finite and strictly positive.
pub fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive(field));
    }
    Ok(())
}

pub fn require_duration(minutes: u32) -> Result<(), ValidationError> {
    if minutes == 0 || minutes > MAX_OFFER_DURATION_MINUTES {
        return Err(ValidationError::Duration {
            max: MAX_OFFER_DURATION_MINUTES,
        });
    }
    Ok(())
}
