//! Decides which dialogs may host or join affiliate programs.
//!
//! Hosting and joining are different capabilities: only an owned bot can
//! host a program, while programs can be joined by the caller's own account,
//! an owned bot, or a broadcast channel the caller can post to. The two
//! checks stay separate so one never grants the other.

use crate::collaborators::{ChatDirectory, DialogAccess, UserDirectory};
use crate::error::AffiliateError;
use crate::ids::{DialogId, UserId};

/// Read-only view over the directories needed for eligibility checks.
#[derive(Clone, Copy)]
pub struct Eligibility<'a> {
    dialogs: &'a dyn DialogAccess,
    users: &'a dyn UserDirectory,
    chats: &'a dyn ChatDirectory,
}

impl<'a> Eligibility<'a> {
    /// Builds a checker over the given directories.
    #[must_use]
    pub const fn new(
        dialogs: &'a dyn DialogAccess,
        users: &'a dyn UserDirectory,
        chats: &'a dyn ChatDirectory,
    ) -> Self {
        Self {
            dialogs,
            users,
            chats,
        }
    }

    /// Checks that the dialog may join programs or list its connections.
    ///
    /// # Errors
    ///
    /// Returns the dialog-access error unchanged when the dialog can't be
    /// read, [`AffiliateError::BotNotOwned`] for foreign users,
    /// [`AffiliateError::NotChannelChat`] for groups and non-broadcast
    /// channels, and [`AffiliateError::NotEnoughRights`] for channels the
    /// caller can't post to.
    ///
    /// # Panics
    ///
    /// Panics for secret chats and empty dialogs, which callers never pass.
    pub fn check_referable(&self, dialog_id: DialogId) -> Result<(), AffiliateError> {
        self.dialogs
            .check_read_access(dialog_id)
            .map_err(AffiliateError::Rejected)?;
        match dialog_id {
            DialogId::User(user_id) => {
                if dialog_id == self.dialogs.my_dialog_id() {
                    return Ok(());
                }
                self.check_owned_bot(user_id)
            }
            DialogId::Chat(_) => Err(AffiliateError::NotChannelChat { dialog_id }),
            DialogId::Channel(channel_id) => {
                if !self.chats.is_broadcast_channel(channel_id) {
                    return Err(AffiliateError::NotChannelChat { dialog_id });
                }
                if !self.chats.channel_permissions(channel_id).can_post_messages {
                    return Err(AffiliateError::NotEnoughRights { dialog_id });
                }
                Ok(())
            }
            DialogId::SecretChat(_) | DialogId::None => unreferable(dialog_id),
        }
    }

    /// Checks that the dialog may host a program.
    ///
    /// # Errors
    ///
    /// Returns the bot-data error unchanged for unknown users,
    /// [`AffiliateError::BotNotOwned`] for foreign bots and
    /// [`AffiliateError::CannotHaveProgram`] for every other dialog kind.
    pub fn check_settable(&self, dialog_id: DialogId) -> Result<(), AffiliateError> {
        match dialog_id {
            DialogId::User(user_id) => self.check_owned_bot(user_id),
            DialogId::Chat(_)
            | DialogId::Channel(_)
            | DialogId::SecretChat(_)
            | DialogId::None => Err(AffiliateError::CannotHaveProgram { dialog_id }),
        }
    }

    fn check_owned_bot(&self, user_id: UserId) -> Result<(), AffiliateError> {
        let bot_data = self
            .users
            .bot_data(user_id)
            .map_err(AffiliateError::Rejected)?;
        if bot_data.can_be_edited {
            Ok(())
        } else {
            Err(AffiliateError::BotNotOwned { user_id })
        }
    }
}

fn unreferable(dialog_id: DialogId) -> ! {
    panic!("{dialog_id} can't take part in affiliate programs")
}
