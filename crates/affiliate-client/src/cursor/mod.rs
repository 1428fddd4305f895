//! Pagination tokens for the two program listings.
//!
//! Connected programs are paged with a [`PageCursor`] built locally from the
//! date and link of the last record received. Suggested programs are paged
//! with a [`SearchOffset`] that the backend hands out and expects back
//! verbatim. The two are separate types so neither can be passed where the
//! other is expected.

use std::fmt;
use std::num::ParseIntError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Position decoded from a [`PageCursor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorPosition {
    /// Date of the last record already seen.
    pub date: i32,
    /// Link of the last record already seen.
    pub url: String,
}

/// Cursor for the connected-programs listing, of the form `"<date> <url>"`.
///
/// The empty cursor addresses the first page.
///
/// # Example
///
/// ```
/// use affiliate_client::PageCursor;
///
/// let cursor = PageCursor::encode(1_700_000_000, "https://t.me/x");
/// assert_eq!(cursor.as_str(), "1700000000 https://t.me/x");
/// let position = cursor.decode().expect("cursor decodes");
/// assert_eq!(position.date, 1_700_000_000);
/// assert_eq!(position.url, "https://t.me/x");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    /// Cursor addressing the first page.
    #[must_use]
    pub const fn start() -> Self {
        Self(String::new())
    }

    /// Wraps a cursor received from a caller.
    #[must_use]
    pub fn new(cursor: impl Into<String>) -> Self {
        Self(cursor.into())
    }

    /// Builds the cursor that follows a record with the given date and link.
    ///
    /// A negative date is written as zero, which [`PageCursor::decode`]
    /// accepts.
    #[must_use]
    pub fn encode(date: i32, url: &str) -> Self {
        Self(format!("{} {url}", date.max(0)))
    }

    /// Whether the cursor addresses the first page.
    #[must_use]
    pub fn is_start(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw cursor text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Splits the cursor back into its date and link.
    ///
    /// # Errors
    ///
    /// Returns [`CursorParseError`] when the text before the first space is
    /// not a non-negative integer.
    pub fn decode(&self) -> Result<CursorPosition, CursorParseError> {
        if self.is_start() {
            return Ok(CursorPosition::default());
        }
        let (date_text, url) = self.0.split_once(' ').unwrap_or((self.0.as_str(), ""));
        let date = date_text
            .parse::<i32>()
            .map_err(|source| CursorParseError::InvalidDate {
                cursor: self.0.clone(),
                source,
            })?;
        if date < 0 {
            return Err(CursorParseError::NegativeDate {
                cursor: self.0.clone(),
            });
        }
        Ok(CursorPosition {
            date,
            url: url.to_owned(),
        })
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Backend-issued offset for the suggested-programs search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchOffset(String);

impl SearchOffset {
    /// Offset addressing the first page.
    #[must_use]
    pub const fn start() -> Self {
        Self(String::new())
    }

    /// Wraps an offset received from the backend or a caller.
    #[must_use]
    pub fn new(offset: impl Into<String>) -> Self {
        Self(offset.into())
    }

    /// Whether no further pages are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw offset text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SearchOffset {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Errors raised while decoding a [`PageCursor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorParseError {
    /// The date part is not an integer.
    #[error("cursor '{cursor}' does not start with a date: {source}")]
    InvalidDate {
        /// Offending cursor.
        cursor: String,
        /// Integer parse failure.
        #[source]
        source: ParseIntError,
    },
    /// The date part is negative.
    #[error("cursor '{cursor}' has a negative date")]
    NegativeDate {
        /// Offending cursor.
        cursor: String,
    },
}
