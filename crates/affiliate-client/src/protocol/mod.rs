//! Wire-level requests and response payloads exchanged with the backend.
//!
//! Requests are serialised with a `method` discriminator carrying the backend
//! method name. Responses arrive from the transport as raw JSON buffers and
//! are decoded into the payload type of the method that was called.
//!
//! Record types decode leniently: fields that identify a record default to
//! zero or empty when missing. Record lists hold [`WireRecord`] entries, so a
//! record with a mistyped field is kept as unreadable and can be dropped
//! without failing the whole response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::ids::{ChannelId, ChatId, DialogId, UserId};
use crate::program::MalformedRecord;

/// Wire address of a user, as issued by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputUser {
    /// Addressed user.
    pub user_id: UserId,
    /// Access hash proving the caller may address the user.
    pub access_hash: i64,
}

/// Wire address of a dialog, as issued by the dialog-access collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputPeer {
    /// The caller's own account.
    #[serde(rename = "self")]
    SelfPeer,
    /// A user or bot.
    User {
        /// Addressed user.
        user_id: UserId,
        /// Access hash for the user.
        access_hash: i64,
    },
    /// A basic group.
    Chat {
        /// Addressed group.
        chat_id: ChatId,
    },
    /// A channel or supergroup.
    Channel {
        /// Addressed channel.
        channel_id: ChannelId,
        /// Access hash for the channel.
        access_hash: i64,
    },
}

/// Peer reference found inside a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Peer {
    /// A user or bot.
    User {
        /// Referenced user.
        user_id: UserId,
    },
    /// A basic group.
    Chat {
        /// Referenced group.
        chat_id: ChatId,
    },
    /// A channel or supergroup.
    Channel {
        /// Referenced channel.
        channel_id: ChannelId,
    },
}

impl Peer {
    /// Dialog addressed by the peer.
    #[must_use]
    pub const fn dialog_id(&self) -> DialogId {
        match self {
            Self::User { user_id } => DialogId::User(*user_id),
            Self::Chat { chat_id } => DialogId::Chat(*chat_id),
            Self::Channel { channel_id } => DialogId::Channel(*channel_id),
        }
    }
}

/// One entry of a record list, kept even when it does not fit its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireRecord<T> {
    /// The entry decoded into `T`.
    Readable(T),
    /// The entry is valid JSON but not a `T`.
    Unreadable {
        /// Entry as received.
        raw: Value,
        /// Why the entry could not be decoded.
        reason: String,
    },
}

impl<T> WireRecord<T> {
    /// The decoded record, or why it could not be decoded.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord::Unreadable`] for entries that did not decode.
    pub fn into_readable(self) -> Result<T, MalformedRecord> {
        match self {
            Self::Readable(record) => Ok(record),
            Self::Unreadable { reason, .. } => Err(MalformedRecord::Unreadable { reason }),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for WireRecord<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(match T::deserialize(&raw) {
            Ok(record) => Self::Readable(record),
            Err(error) => Self::Unreadable {
                reason: error.to_string(),
                raw,
            },
        })
    }
}

impl<T: Serialize> Serialize for WireRecord<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Readable(record) => record.serialize(serializer),
            Self::Unreadable { raw, .. } => raw.serialize(serializer),
        }
    }
}

/// Raw Star amount as reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarsAmount {
    /// Whole Stars.
    pub amount: i64,
    /// Fractional part, in billionths of a Star.
    #[serde(default)]
    pub nanos: i32,
}

/// Minimal user record embedded in responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStub {
    /// User identifier.
    #[serde(default)]
    pub id: UserId,
    /// Access hash, when the backend sent one.
    #[serde(default)]
    pub access_hash: Option<i64>,
    /// Display name.
    #[serde(default)]
    pub first_name: String,
    /// Public username.
    #[serde(default)]
    pub username: Option<String>,
    /// Whether the user is a bot.
    #[serde(default)]
    pub bot: bool,
}

/// Minimal chat record embedded in responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatStub {
    /// Chat or channel identifier.
    #[serde(default)]
    pub id: i64,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Whether the record describes a channel rather than a basic group.
    #[serde(default)]
    pub channel: bool,
    /// Whether the channel is a broadcast channel.
    #[serde(default)]
    pub broadcast: bool,
}

/// Affiliate program offered by a bot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarRefProgram {
    /// Bot hosting the program.
    #[serde(default)]
    pub bot_id: UserId,
    /// Commission paid to affiliates, in per-mille.
    #[serde(default)]
    pub commission_permille: i32,
    /// Program duration; absent means unlimited.
    #[serde(default)]
    pub duration_months: Option<i32>,
    /// Date the program stops accepting affiliates.
    #[serde(default)]
    pub end_date: Option<i32>,
    /// Average daily revenue per referred user.
    #[serde(default)]
    pub daily_revenue_per_user: Option<StarsAmount>,
}

/// Affiliate program connected to a dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedBotStarRef {
    /// Whether the referral link was revoked.
    #[serde(default)]
    pub revoked: bool,
    /// Referral link.
    #[serde(default)]
    pub url: String,
    /// Date the program was connected.
    #[serde(default)]
    pub date: i32,
    /// Bot hosting the program.
    #[serde(default)]
    pub bot_id: UserId,
    /// Commission paid to the affiliate, in per-mille.
    #[serde(default)]
    pub commission_permille: i32,
    /// Program duration; absent means unlimited.
    #[serde(default)]
    pub duration_months: Option<i32>,
    /// Users referred through the link.
    #[serde(default)]
    pub participants: i64,
    /// Revenue earned through the link.
    #[serde(default)]
    pub revenue: Option<StarsAmount>,
}

/// Payload of `payments.getSuggestedStarRefBots`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedStarRefBots {
    /// Total number of programs, as reported by the backend.
    #[serde(default)]
    pub count: i32,
    /// Programs on this page.
    #[serde(default)]
    pub suggested_bots: Vec<WireRecord<StarRefProgram>>,
    /// Users referenced by the programs.
    #[serde(default)]
    pub users: Vec<WireRecord<UserStub>>,
    /// Offset of the next page, absent on the last page.
    #[serde(default)]
    pub next_offset: Option<String>,
}

/// Payload shared by the connected-program methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedStarRefBots {
    /// Total number of connected programs, as reported by the backend.
    #[serde(default)]
    pub count: i32,
    /// Connected programs on this page.
    #[serde(default)]
    pub connected_bots: Vec<WireRecord<ConnectedBotStarRef>>,
    /// Users referenced by the programs.
    #[serde(default)]
    pub users: Vec<WireRecord<UserStub>>,
}

/// Payload of `contacts.resolveUsername`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPeer {
    /// Peer the username resolved to.
    pub peer: Peer,
    /// Chats referenced by the response.
    #[serde(default)]
    pub chats: Vec<WireRecord<ChatStub>>,
    /// Users referenced by the response.
    #[serde(default)]
    pub users: Vec<WireRecord<UserStub>>,
}

/// Request sent to the backend through the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum WireRequest {
    /// Sets or clears the affiliate program of a bot.
    #[serde(rename = "bots.updateStarRefProgram")]
    UpdateStarRefProgram {
        /// Bot hosting the program.
        bot: InputUser,
        /// Commission in per-mille; zero ends the program.
        commission_permille: i32,
        /// Duration, present only for limited programs.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_months: Option<i32>,
    },
    /// Resolves a username, optionally through a referral code.
    #[serde(rename = "contacts.resolveUsername")]
    ResolveUsername {
        /// Username to resolve.
        username: String,
        /// Referral code from the affiliate link.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        referer: Option<String>,
    },
    /// Searches programs a dialog may join.
    #[serde(rename = "payments.getSuggestedStarRefBots")]
    GetSuggestedStarRefBots {
        /// Order by revenue instead of profitability.
        order_by_revenue: bool,
        /// Order by creation date instead of profitability.
        order_by_date: bool,
        /// Dialog that would become the affiliate.
        peer: InputPeer,
        /// Backend-issued page offset.
        offset: String,
        /// Page size.
        limit: i32,
    },
    /// Joins a bot's program.
    #[serde(rename = "payments.connectStarRefBot")]
    ConnectStarRefBot {
        /// Dialog that becomes the affiliate.
        peer: InputPeer,
        /// Bot hosting the program.
        bot: InputUser,
    },
    /// Edits a connected program, keyed by its link.
    #[serde(rename = "payments.editConnectedStarRefBot")]
    EditConnectedStarRefBot {
        /// Revoke the referral link.
        revoked: bool,
        /// Affiliate dialog.
        peer: InputPeer,
        /// Referral link of the program.
        link: String,
    },
    /// Fetches the connection between a dialog and one bot.
    #[serde(rename = "payments.getConnectedStarRefBot")]
    GetConnectedStarRefBot {
        /// Affiliate dialog.
        peer: InputPeer,
        /// Bot hosting the program.
        bot: InputUser,
    },
    /// Lists programs connected to a dialog.
    #[serde(rename = "payments.getConnectedStarRefBots")]
    GetConnectedStarRefBots {
        /// Affiliate dialog.
        peer: InputPeer,
        /// Date of the last record already seen.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset_date: Option<i32>,
        /// Link of the last record already seen.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset_link: Option<String>,
        /// Page size.
        limit: i32,
    },
}

impl WireRequest {
    /// Backend method name of the request.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::UpdateStarRefProgram { .. } => UPDATE_STAR_REF_PROGRAM,
            Self::ResolveUsername { .. } => RESOLVE_USERNAME,
            Self::GetSuggestedStarRefBots { .. } => GET_SUGGESTED_STAR_REF_BOTS,
            Self::ConnectStarRefBot { .. } => CONNECT_STAR_REF_BOT,
            Self::EditConnectedStarRefBot { .. } => EDIT_CONNECTED_STAR_REF_BOT,
            Self::GetConnectedStarRefBot { .. } => GET_CONNECTED_STAR_REF_BOT,
            Self::GetConnectedStarRefBots { .. } => GET_CONNECTED_STAR_REF_BOTS,
        }
    }
}

/// Method name of [`WireRequest::UpdateStarRefProgram`].
pub const UPDATE_STAR_REF_PROGRAM: &str = "bots.updateStarRefProgram";
/// Method name of [`WireRequest::ResolveUsername`].
pub const RESOLVE_USERNAME: &str = "contacts.resolveUsername";
/// Method name of [`WireRequest::GetSuggestedStarRefBots`].
pub const GET_SUGGESTED_STAR_REF_BOTS: &str = "payments.getSuggestedStarRefBots";
/// Method name of [`WireRequest::ConnectStarRefBot`].
pub const CONNECT_STAR_REF_BOT: &str = "payments.connectStarRefBot";
/// Method name of [`WireRequest::EditConnectedStarRefBot`].
pub const EDIT_CONNECTED_STAR_REF_BOT: &str = "payments.editConnectedStarRefBot";
/// Method name of [`WireRequest::GetConnectedStarRefBot`].
pub const GET_CONNECTED_STAR_REF_BOT: &str = "payments.getConnectedStarRefBot";
/// Method name of [`WireRequest::GetConnectedStarRefBots`].
pub const GET_CONNECTED_STAR_REF_BOTS: &str = "payments.getConnectedStarRefBots";
