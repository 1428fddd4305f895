//! Services the client consumes but does not own.
//!
//! Directories resolve identifiers and remember the entities embedded in
//! responses; the client only ever adds to them. Keeping them behind traits
//! lets tests inject in-memory doubles.

use std::fmt;
use std::sync::Arc;

use crate::error::{AffiliateError, RemoteError};
use crate::ids::{ChannelId, DialogId, UserId};
use crate::program::{ProgramInfo, StarCount};
use crate::protocol::{ChatStub, InputPeer, InputUser, StarsAmount, UserStub};
use crate::transport::Transport;

/// Facts the user directory holds about a bot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BotData {
    /// Whether the caller owns the bot.
    pub can_be_edited: bool,
}

/// The caller's rights in a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelPermissions {
    /// Whether the caller may post messages.
    pub can_post_messages: bool,
}

/// Access checks and bookkeeping for dialogs.
pub trait DialogAccess: Send + Sync {
    /// Checks that the caller can read the dialog.
    ///
    /// # Errors
    ///
    /// Returns the directory's own classification of the failure.
    fn check_read_access(&self, dialog_id: DialogId) -> Result<(), RemoteError>;

    /// The caller's own dialog.
    fn my_dialog_id(&self) -> DialogId;

    /// Wire address of the dialog, when one is known.
    fn input_peer(&self, dialog_id: DialogId) -> Option<InputPeer>;

    /// Makes sure the dialog is tracked locally.
    fn force_create_dialog(&self, dialog_id: DialogId, source: &'static str);

    /// Records a failed request addressed to the dialog.
    fn on_dialog_error(&self, dialog_id: DialogId, error: &AffiliateError, source: &'static str);
}

/// Lookup and ingestion of users and bots.
pub trait UserDirectory: Send + Sync {
    /// Bot facts for the user.
    ///
    /// # Errors
    ///
    /// Returns the directory's error when the user is unknown or not a bot.
    fn bot_data(&self, user_id: UserId) -> Result<BotData, RemoteError>;

    /// Wire address of the user.
    ///
    /// # Errors
    ///
    /// Returns the directory's error when no access hash is known.
    fn input_user(&self, user_id: UserId) -> Result<InputUser, RemoteError>;

    /// Whether the user is known.
    fn have_user(&self, user_id: UserId) -> bool;

    /// Ingests user records embedded in a response.
    fn on_get_users(&self, users: Vec<UserStub>, source: &'static str);

    /// Stores the program a bot now hosts, `None` once it has ended.
    fn on_update_referral_program_info(&self, user_id: UserId, info: Option<ProgramInfo>);
}

/// Lookup and ingestion of groups and channels.
pub trait ChatDirectory: Send + Sync {
    /// Whether the channel is a broadcast channel.
    fn is_broadcast_channel(&self, channel_id: ChannelId) -> bool;

    /// The caller's rights in the channel.
    fn channel_permissions(&self, channel_id: ChannelId) -> ChannelPermissions;

    /// Ingests chat records embedded in a response.
    fn on_get_chats(&self, chats: Vec<ChatStub>, source: &'static str);
}

/// Normalisation of raw Star amounts.
pub trait StarAmounts: Send + Sync {
    /// Displayable Star count for a raw amount.
    fn star_count(&self, amount: &StarsAmount) -> StarCount;
}

/// Shared handles to every collaborator, injected at construction.
#[derive(Clone)]
pub struct Collaborators {
    /// Sends requests and delivers responses.
    pub transport: Arc<dyn Transport>,
    /// Dialog access checks and bookkeeping.
    pub dialogs: Arc<dyn DialogAccess>,
    /// User and bot directory.
    pub users: Arc<dyn UserDirectory>,
    /// Group and channel directory.
    pub chats: Arc<dyn ChatDirectory>,
    /// Star amount normalisation.
    pub stars: Arc<dyn StarAmounts>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Collaborators")
    }
}
