//! Identifiers for users, chats and the dialogs built on top of them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest user identifier the backend assigns.
const MAX_USER_ID: i64 = (1 << 40) - 1;

/// Identifier of a user or bot.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether the identifier can refer to an existing user.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        0 < self.0 && self.0 <= MAX_USER_ID
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "user {}", self.0)
    }
}

/// Identifier of a basic group.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChatId(i64);

impl ChatId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// Identifier of a channel or supergroup.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChannelId(i64);

impl ChannelId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// Identifier of an end-to-end encrypted chat.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SecretChatId(i32);

impl SecretChatId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// A dialog, tagged by the kind of peer it talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DialogId {
    /// Private dialog with a user or bot.
    User(UserId),
    /// Basic group.
    Chat(ChatId),
    /// Channel or supergroup.
    Channel(ChannelId),
    /// End-to-end encrypted chat.
    SecretChat(SecretChatId),
    /// No dialog.
    #[default]
    None,
}

impl DialogId {
    /// User behind a private dialog.
    #[must_use]
    pub const fn user_id(self) -> Option<UserId> {
        match self {
            Self::User(user_id) => Some(user_id),
            _ => None,
        }
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(formatter, "user dialog {}", id.get()),
            Self::Chat(id) => write!(formatter, "chat dialog {}", id.get()),
            Self::Channel(id) => write!(formatter, "channel dialog {}", id.get()),
            Self::SecretChat(id) => write!(formatter, "secret chat dialog {}", id.get()),
            Self::None => formatter.write_str("empty dialog"),
        }
    }
}
