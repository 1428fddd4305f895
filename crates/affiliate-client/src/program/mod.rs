//! Domain values describing affiliate programs.
//!
//! Values are built from wire records by the response handlers and handed
//! to callers; none of them is cached. Building a value from a record checks
//! it, so a malformed record surfaces as a [`MalformedRecord`] that the
//! handler logs and skips.

use affiliate_config::ProgramLimits;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::collaborators::StarAmounts;
use crate::cursor::{PageCursor, SearchOffset};
use crate::ids::{DialogId, UserId};
use crate::protocol::{ConnectedBotStarRef, StarRefProgram};

/// Number of Stars after normalisation by the accounting subsystem.
pub type StarCount = i64;

/// Largest commission a well-formed record may carry, in per-mille.
const MAX_COMMISSION_PERMILLE: i32 = 999;

/// Longest duration a well-formed record may carry, in months.
const MAX_MONTH_COUNT: i32 = 36;

/// Commission and duration of an affiliate program.
///
/// `ProgramParameters::default()` is the unset sentinel: setting it ends the
/// bot's program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramParameters {
    commission_permille: i32,
    month_count: i32,
}

impl ProgramParameters {
    /// Builds parameters; a month count of zero means unlimited.
    #[must_use]
    pub const fn new(commission_permille: i32, month_count: i32) -> Self {
        Self {
            commission_permille,
            month_count,
        }
    }

    /// Commission paid to affiliates, in per-mille.
    #[must_use]
    pub const fn commission_permille(&self) -> i32 {
        self.commission_permille
    }

    /// Duration in months, zero when unlimited.
    #[must_use]
    pub const fn month_count(&self) -> i32 {
        self.month_count
    }

    /// Whether these are the unset sentinel.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.commission_permille == 0 && self.month_count == 0
    }

    /// Whether a backend record with these terms can be shown at all.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        0 < self.commission_permille
            && self.commission_permille <= MAX_COMMISSION_PERMILLE
            && 0 <= self.month_count
            && self.month_count <= MAX_MONTH_COUNT
    }

    /// Whether a caller may set these terms under the given limits.
    #[must_use]
    pub fn is_allowed_by(&self, limits: &ProgramLimits) -> bool {
        limits.allows_commission(self.commission_permille)
            && limits.allows_month_count(self.month_count)
    }

    /// Duration as sent on the wire: absent for unlimited programs.
    pub(crate) const fn wire_duration(&self) -> Option<i32> {
        if self.month_count == 0 {
            None
        } else {
            Some(self.month_count)
        }
    }
}

/// Reasons a wire record is dropped instead of being shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
    /// The record does not match the expected wire shape.
    #[error("unreadable record: {reason}")]
    Unreadable {
        /// Decoder message.
        reason: String,
    },
    /// The bot identifier is zero or out of range.
    #[error("invalid bot identifier {bot_id}")]
    InvalidBot {
        /// Identifier found in the record.
        bot_id: i64,
    },
    /// The referral link is empty.
    #[error("missing referral link")]
    MissingUrl,
    /// Commission or duration are out of range.
    #[error("invalid terms: commission {commission_permille}, {month_count} months")]
    InvalidTerms {
        /// Commission found in the record.
        commission_permille: i32,
        /// Duration found in the record.
        month_count: i32,
    },
    /// The end date is negative.
    #[error("invalid end date {end_date}")]
    InvalidEndDate {
        /// End date found in the record.
        end_date: i32,
    },
    /// A connected program has a negative connection date.
    #[error("invalid connection date {date}")]
    InvalidDate {
        /// Date found in the record.
        date: i32,
    },
    /// A connected program has a negative participant count.
    #[error("invalid participant count {participants}")]
    InvalidParticipantCount {
        /// Count found in the record.
        participants: i64,
    },
    /// A connected program carries no revenue amount.
    #[error("missing revenue")]
    MissingRevenue,
}

/// Terms of a program together with backend-assigned metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramInfo {
    parameters: ProgramParameters,
    end_date: i32,
    daily_revenue_per_user: StarCount,
}

impl ProgramInfo {
    /// Checks a wire program and normalises its revenue.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord`] when the terms are out of range or the end
    /// date is negative.
    pub fn from_record(
        record: &StarRefProgram,
        stars: &dyn StarAmounts,
    ) -> Result<Self, MalformedRecord> {
        let parameters =
            ProgramParameters::new(record.commission_permille, record.duration_months.unwrap_or(0));
        if !parameters.is_well_formed() {
            return Err(MalformedRecord::InvalidTerms {
                commission_permille: parameters.commission_permille(),
                month_count: parameters.month_count(),
            });
        }
        let end_date = record.end_date.unwrap_or(0);
        if end_date < 0 {
            return Err(MalformedRecord::InvalidEndDate { end_date });
        }
        let daily_revenue_per_user = record
            .daily_revenue_per_user
            .as_ref()
            .map_or(0, |amount| stars.star_count(amount));
        Ok(Self {
            parameters,
            end_date,
            daily_revenue_per_user,
        })
    }

    /// Program terms.
    #[must_use]
    pub const fn parameters(&self) -> ProgramParameters {
        self.parameters
    }

    /// Date the program stops accepting affiliates, zero if never.
    #[must_use]
    pub const fn end_date(&self) -> i32 {
        self.end_date
    }

    /// Average daily revenue per referred user.
    #[must_use]
    pub const fn daily_revenue_per_user(&self) -> StarCount {
        self.daily_revenue_per_user
    }
}

/// A program a dialog may join, as returned by the suggested search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedProgram {
    bot_user_id: UserId,
    info: ProgramInfo,
}

impl SuggestedProgram {
    /// Checks a wire program.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord`] when the bot identifier is invalid or the
    /// program info is malformed.
    pub fn from_record(
        record: &StarRefProgram,
        stars: &dyn StarAmounts,
    ) -> Result<Self, MalformedRecord> {
        if !record.bot_id.is_valid() {
            return Err(MalformedRecord::InvalidBot {
                bot_id: record.bot_id.get(),
            });
        }
        Ok(Self {
            bot_user_id: record.bot_id,
            info: ProgramInfo::from_record(record, stars)?,
        })
    }

    /// Bot hosting the program.
    #[must_use]
    pub const fn bot_user_id(&self) -> UserId {
        self.bot_user_id
    }

    /// Program terms and metadata.
    #[must_use]
    pub const fn info(&self) -> &ProgramInfo {
        &self.info
    }
}

/// A program connected to a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedProgram {
    url: String,
    connected_at: i32,
    bot_user_id: UserId,
    parameters: ProgramParameters,
    participant_count: i64,
    revenue: StarCount,
    is_revoked: bool,
}

impl ConnectedProgram {
    /// Checks a wire record and normalises its revenue.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord`] when the bot identifier is invalid, the
    /// link is empty, the date or participant count is negative, or the
    /// revenue is missing.
    pub fn from_record(
        record: ConnectedBotStarRef,
        stars: &dyn StarAmounts,
    ) -> Result<Self, MalformedRecord> {
        if !record.bot_id.is_valid() {
            return Err(MalformedRecord::InvalidBot {
                bot_id: record.bot_id.get(),
            });
        }
        if record.url.is_empty() {
            return Err(MalformedRecord::MissingUrl);
        }
        if record.date < 0 {
            return Err(MalformedRecord::InvalidDate { date: record.date });
        }
        if record.participants < 0 {
            return Err(MalformedRecord::InvalidParticipantCount {
                participants: record.participants,
            });
        }
        let revenue = record.revenue.ok_or(MalformedRecord::MissingRevenue)?;
        Ok(Self {
            url: record.url,
            connected_at: record.date,
            bot_user_id: record.bot_id,
            parameters: ProgramParameters::new(
                record.commission_permille,
                record.duration_months.unwrap_or(0),
            ),
            participant_count: record.participants,
            revenue: stars.star_count(&revenue),
            is_revoked: record.revoked,
        })
    }

    /// Referral link.
    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Date the program was connected.
    #[must_use]
    pub const fn connected_at(&self) -> i32 {
        self.connected_at
    }

    /// Bot hosting the program.
    #[must_use]
    pub const fn bot_user_id(&self) -> UserId {
        self.bot_user_id
    }

    /// Terms the dialog joined under.
    #[must_use]
    pub const fn parameters(&self) -> ProgramParameters {
        self.parameters
    }

    /// Users referred through the link.
    #[must_use]
    pub const fn participant_count(&self) -> i64 {
        self.participant_count
    }

    /// Revenue earned through the link.
    #[must_use]
    pub const fn revenue(&self) -> StarCount {
        self.revenue
    }

    /// Whether the link was revoked.
    #[must_use]
    pub const fn is_revoked(&self) -> bool {
        self.is_revoked
    }
}

/// Ordering of suggested-program search results.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortOrder {
    /// Most profitable first.
    #[default]
    Profitability,
    /// Newest first.
    Date,
    /// Highest revenue first.
    Revenue,
}

/// Dialog materialised for a bot reached through a referral link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatReference {
    dialog_id: DialogId,
}

impl ChatReference {
    /// Wraps a materialised dialog.
    #[must_use]
    pub const fn new(dialog_id: DialogId) -> Self {
        Self { dialog_id }
    }

    /// The materialised dialog.
    #[must_use]
    pub const fn dialog_id(&self) -> DialogId {
        self.dialog_id
    }
}

/// One page of suggested-program search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundPrograms {
    /// Total number of programs, never below the number on this page.
    pub total_count: i32,
    /// Programs on this page.
    pub programs: Vec<SuggestedProgram>,
    /// Offset of the next page, empty on the last page.
    pub next_offset: SearchOffset,
}

/// One page of programs connected to a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedPrograms {
    /// Total number of programs, never below the number on this page.
    pub total_count: i32,
    /// Programs on this page.
    pub programs: Vec<ConnectedProgram>,
    /// Cursor of the next page.
    pub next_cursor: PageCursor,
}
