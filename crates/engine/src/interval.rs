//! Checkpoint range over a destination list.
//!
//! `[start, end)` with `end == 0` meaning "to the end of the list". Bounds are
//! signed because they come straight from user input and must be rejected,
//! not wrapped, when negative.

use bulkmail_common::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Reject negative bounds and a start past a non-sentinel end.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start < 0 || self.end < 0 {
            return Err(ValidationError::NegativeBound {
                start: self.start,
                end: self.end,
            });
        }

        if self.start > self.end && self.end != 0 {
            return Err(ValidationError::StartAfterEnd {
                start: self.start,
                end: self.end,
            });
        }

        Ok(())
    }

    /// Concrete `start..end` indices into a list of `len` entries.
    ///
    /// Must be called on a validated interval whose start fits the list. The
    /// sentinel end becomes `len`; an end past the list is clamped to `len`.
    pub(crate) fn bounds(&self, len: usize) -> (usize, usize) {
        let start = usize::try_from(self.start).unwrap_or(0).min(len);
        let end = match usize::try_from(self.end) {
            Ok(0) | Err(_) => len,
            Ok(end) => end.min(len),
        };
        (start, end)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.end == 0 {
            write!(f, "[{}, end)", self.start)
        } else {
            write!(f, "[{}, {})", self.start, self.end)
        }
    }
}
