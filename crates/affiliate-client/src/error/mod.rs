//! Errors surfaced to callers of the affiliate client.
//!
//! Every failure carries a numeric code in the backend's convention. Rejected
//! input is `400`, impossible responses are `500`, and failures forwarded from
//! collaborators or the transport keep their own code.

use thiserror::Error;

use crate::cursor::CursorParseError;
use crate::ids::{DialogId, UserId};

/// Failure reported by the backend or a collaborator, carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct RemoteError {
    code: i32,
    message: String,
}

impl RemoteError {
    /// Builds an error from a code and message.
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Numeric error code.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Errors returned by [`crate::AffiliateManager`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AffiliateError {
    /// Program terms are neither valid nor the unset sentinel.
    #[error("Invalid affiliate parameters specified")]
    InvalidParameters {
        /// Rejected commission.
        commission_permille: i32,
        /// Rejected duration.
        month_count: i32,
    },

    /// A page size was zero or negative.
    #[error("Limit must be positive")]
    LimitNotPositive {
        /// Rejected limit.
        limit: i32,
    },

    /// The bot exists but the caller can't edit it.
    #[error("The bot isn't owned")]
    BotNotOwned {
        /// Bot that was checked.
        user_id: UserId,
    },

    /// A referral target is a basic group or a non-broadcast channel.
    #[error("The chat must be a channel chat")]
    NotChannelChat {
        /// Rejected dialog.
        dialog_id: DialogId,
    },

    /// The caller can't post to the target channel.
    #[error("Not enough rights in the chat")]
    NotEnoughRights {
        /// Rejected dialog.
        dialog_id: DialogId,
    },

    /// Only bots may host a program.
    #[error("The chat can't have affiliate program")]
    CannotHaveProgram {
        /// Rejected dialog.
        dialog_id: DialogId,
    },

    /// A page cursor could not be decoded.
    #[error("Invalid offset specified: {source}")]
    InvalidCursor {
        /// Decoding failure.
        #[source]
        source: CursorParseError,
    },

    /// No wire-level address is known for the dialog.
    #[error("Have no access to the chat")]
    NoAccess {
        /// Dialog that could not be addressed.
        dialog_id: DialogId,
    },

    /// A referral link resolved to something other than a known user.
    #[error("Chat not found")]
    ChatNotFound,

    /// The backend returned a payload that can't be correct.
    #[error("Receive invalid response from {method}: {reason}")]
    InvalidResponse {
        /// Backend method that produced the payload.
        method: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// A collaborator rejected the call.
    #[error(transparent)]
    Rejected(RemoteError),

    /// The transport failed to deliver the request or its response.
    #[error("request failed: {0}")]
    Transport(RemoteError),
}

impl AffiliateError {
    /// Numeric code in the backend's convention.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::InvalidResponse { .. } => 500,
            Self::Rejected(remote) | Self::Transport(remote) => remote.code(),
            _ => 400,
        }
    }

    /// Whether the error was raised before anything was sent.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameters { .. }
                | Self::LimitNotPositive { .. }
                | Self::BotNotOwned { .. }
                | Self::NotChannelChat { .. }
                | Self::NotEnoughRights { .. }
                | Self::CannotHaveProgram { .. }
                | Self::InvalidCursor { .. }
                | Self::NoAccess { .. }
        )
    }

    pub(crate) fn invalid_response(method: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            method,
            reason: reason.into(),
        }
    }
}

impl From<CursorParseError> for AffiliateError {
    fn from(source: CursorParseError) -> Self {
        Self::InvalidCursor { source }
    }
}
