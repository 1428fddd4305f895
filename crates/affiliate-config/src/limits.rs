//! Backend-defined bounds for affiliate program terms.
//!
//! The backend publishes the commission range it accepts; the set of program
//! durations is fixed. [`ProgramLimits`] carries both so callers can reject
//! bad terms before a request is ever sent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults::{
    ALLOWED_MONTH_COUNTS, DEFAULT_MAX_COMMISSION_PERMILLE, DEFAULT_MIN_COMMISSION_PERMILLE,
};

/// Upper bound of any per-mille commission.
const PERMILLE_CEILING: i32 = 999;

/// Accepted commission range and durations for affiliate programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProgramLimits {
    min_commission_permille: i32,
    max_commission_permille: i32,
}

impl ProgramLimits {
    /// Builds limits from an inclusive commission range.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramLimitsError`] when the range is empty or falls outside
    /// `1..=999`.
    pub fn new(
        min_commission_permille: i32,
        max_commission_permille: i32,
    ) -> Result<Self, ProgramLimitsError> {
        if min_commission_permille < 1 || max_commission_permille > PERMILLE_CEILING {
            return Err(ProgramLimitsError::OutOfRange {
                min: min_commission_permille,
                max: max_commission_permille,
            });
        }
        if min_commission_permille > max_commission_permille {
            return Err(ProgramLimitsError::EmptyRange {
                min: min_commission_permille,
                max: max_commission_permille,
            });
        }
        Ok(Self {
            min_commission_permille,
            max_commission_permille,
        })
    }

    /// Smallest accepted commission.
    #[must_use]
    pub const fn min_commission_permille(&self) -> i32 {
        self.min_commission_permille
    }

    /// Largest accepted commission.
    #[must_use]
    pub const fn max_commission_permille(&self) -> i32 {
        self.max_commission_permille
    }

    /// Whether the commission lies inside the accepted range.
    #[must_use]
    pub const fn allows_commission(&self, commission_permille: i32) -> bool {
        self.min_commission_permille <= commission_permille
            && commission_permille <= self.max_commission_permille
    }

    /// Whether the duration is one of the accepted month counts.
    #[must_use]
    pub fn allows_month_count(&self, month_count: i32) -> bool {
        ALLOWED_MONTH_COUNTS.contains(&month_count)
    }
}

impl Default for ProgramLimits {
    fn default() -> Self {
        Self {
            min_commission_permille: DEFAULT_MIN_COMMISSION_PERMILLE,
            max_commission_permille: DEFAULT_MAX_COMMISSION_PERMILLE,
        }
    }
}

/// Errors raised while building [`ProgramLimits`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramLimitsError {
    /// A bound lies outside `1..=999`.
    #[error("commission range {min}..={max} must lie within 1..=999")]
    OutOfRange {
        /// Configured lower bound.
        min: i32,
        /// Configured upper bound.
        max: i32,
    },
    /// The lower bound exceeds the upper bound.
    #[error("commission range {min}..={max} is empty")]
    EmptyRange {
        /// Configured lower bound.
        min: i32,
        /// Configured upper bound.
        max: i32,
    },
}
