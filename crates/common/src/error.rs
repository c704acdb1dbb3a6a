use thiserror::Error;

use crate::types::AccountId;

/// Input problems detected before anything is sent.
///
/// None of these are partial: a run that fails validation performs zero sends,
/// and the caller can retry after correcting the offending value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("interval start ({start}) and end ({end}) must both be non-negative integers")]
    NegativeBound { start: i64, end: i64 },

    #[error("interval start value ({start}) is greater than end value ({end})")]
    StartAfterEnd { start: i64, end: i64 },

    #[error("interval start value ({start}) is greater than number of destinations ({count})")]
    StartBeyondDestinations { start: i64, count: usize },

    #[error("sleep interval ({0}ms) is < 0")]
    NegativePacing(i64),

    #[error("sleep interval ({0}ms) is out of range")]
    PacingOutOfRange(i64),

    #[error("invalid email address: {0:?}")]
    InvalidAddress(String),
}

impl ValidationError {
    /// Whether this is a malformed checkpoint range (as opposed to a range that
    /// does not fit the destination list).
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            ValidationError::NegativeBound { .. } | ValidationError::StartAfterEnd { .. }
        )
    }
}

/// Failures from the contact store while resolving account descriptors.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no registration with a contact found for account {0}")]
    NotFound(AccountId),

    #[error("contact store error: {0}")]
    Store(#[from] sqlx::Error),
}
