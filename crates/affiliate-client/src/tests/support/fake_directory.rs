//! In-memory directories that record what the client tells them.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::collaborators::{
    BotData, ChannelPermissions, ChatDirectory, DialogAccess, StarAmounts, UserDirectory,
};
use crate::error::{AffiliateError, RemoteError};
use crate::ids::{ChannelId, DialogId, UserId};
use crate::program::{ProgramInfo, StarCount};
use crate::protocol::{ChatStub, InputPeer, InputUser, StarsAmount, UserStub};

#[derive(Default)]
struct DirectoryState {
    my_dialog: DialogId,
    bots: HashMap<UserId, BotData>,
    known_users: HashSet<UserId>,
    channels: HashMap<ChannelId, (bool, ChannelPermissions)>,
    unreadable: HashSet<DialogId>,
    unaddressable: HashSet<DialogId>,
    dialog_errors: Vec<(DialogId, AffiliateError, &'static str)>,
    ingested_users: Vec<(UserId, &'static str)>,
    ingested_chats: Vec<(i64, &'static str)>,
    created_dialogs: Vec<DialogId>,
    program_updates: Vec<(UserId, Option<ProgramInfo>)>,
}

/// Implements every directory trait over shared in-memory state.
#[derive(Clone, Default)]
pub struct FakeDirectory {
    shared: Arc<Mutex<DirectoryState>>,
}

impl FakeDirectory {
    pub fn new(me: UserId) -> Self {
        let directory = Self::default();
        {
            let mut state = directory.lock();
            state.my_dialog = DialogId::User(me);
            state.known_users.insert(me);
        }
        directory
    }

    /// Registers a bot; `owned` controls `can_be_edited`.
    pub fn with_bot(self, bot: UserId, owned: bool) -> Self {
        {
            let mut state = self.lock();
            state.bots.insert(
                bot,
                BotData {
                    can_be_edited: owned,
                },
            );
            state.known_users.insert(bot);
        }
        self
    }

    pub fn with_user(self, user: UserId) -> Self {
        self.lock().known_users.insert(user);
        self
    }

    pub fn with_channel(self, channel: ChannelId, broadcast: bool, can_post_messages: bool) -> Self {
        self.lock()
            .channels
            .insert(channel, (broadcast, ChannelPermissions { can_post_messages }));
        self
    }

    pub fn with_unreadable(self, dialog_id: DialogId) -> Self {
        self.lock().unreadable.insert(dialog_id);
        self
    }

    pub fn with_unaddressable(self, dialog_id: DialogId) -> Self {
        self.lock().unaddressable.insert(dialog_id);
        self
    }

    pub fn dialog_errors(&self) -> Vec<(DialogId, AffiliateError, &'static str)> {
        self.lock().dialog_errors.clone()
    }

    pub fn ingested_users(&self) -> Vec<(UserId, &'static str)> {
        self.lock().ingested_users.clone()
    }

    pub fn ingested_chats(&self) -> Vec<(i64, &'static str)> {
        self.lock().ingested_chats.clone()
    }

    pub fn created_dialogs(&self) -> Vec<DialogId> {
        self.lock().created_dialogs.clone()
    }

    pub fn program_updates(&self) -> Vec<(UserId, Option<ProgramInfo>)> {
        self.lock().program_updates.clone()
    }

    fn lock(&self) -> MutexGuard<'_, DirectoryState> {
        self.shared.lock().expect("directory lock poisoned")
    }
}

fn not_found() -> RemoteError {
    RemoteError::new(400, "Chat not found")
}

impl DialogAccess for FakeDirectory {
    fn check_read_access(&self, dialog_id: DialogId) -> Result<(), RemoteError> {
        if self.lock().unreadable.contains(&dialog_id) {
            return Err(not_found());
        }
        Ok(())
    }

    fn my_dialog_id(&self) -> DialogId {
        self.lock().my_dialog
    }

    fn input_peer(&self, dialog_id: DialogId) -> Option<InputPeer> {
        let state = self.lock();
        if state.unaddressable.contains(&dialog_id) {
            return None;
        }
        if dialog_id == state.my_dialog {
            return Some(InputPeer::SelfPeer);
        }
        match dialog_id {
            DialogId::User(user_id) => Some(InputPeer::User {
                user_id,
                access_hash: user_id.get() * 10,
            }),
            DialogId::Chat(chat_id) => Some(InputPeer::Chat { chat_id }),
            DialogId::Channel(channel_id) => Some(InputPeer::Channel {
                channel_id,
                access_hash: channel_id.get() * 10,
            }),
            DialogId::SecretChat(_) | DialogId::None => None,
        }
    }

    fn force_create_dialog(&self, dialog_id: DialogId, _source: &'static str) {
        self.lock().created_dialogs.push(dialog_id);
    }

    fn on_dialog_error(&self, dialog_id: DialogId, error: &AffiliateError, source: &'static str) {
        self.lock()
            .dialog_errors
            .push((dialog_id, error.clone(), source));
    }
}

impl UserDirectory for FakeDirectory {
    fn bot_data(&self, user_id: UserId) -> Result<BotData, RemoteError> {
        self.lock()
            .bots
            .get(&user_id)
            .copied()
            .ok_or_else(|| RemoteError::new(400, "Bot not found"))
    }

    fn input_user(&self, user_id: UserId) -> Result<InputUser, RemoteError> {
        if !self.lock().known_users.contains(&user_id) {
            return Err(RemoteError::new(400, "Have no access to the user"));
        }
        Ok(InputUser {
            user_id,
            access_hash: user_id.get() * 10,
        })
    }

    fn have_user(&self, user_id: UserId) -> bool {
        self.lock().known_users.contains(&user_id)
    }

    fn on_get_users(&self, users: Vec<UserStub>, source: &'static str) {
        let mut state = self.lock();
        for user in users {
            state.known_users.insert(user.id);
            state.ingested_users.push((user.id, source));
        }
    }

    fn on_update_referral_program_info(&self, user_id: UserId, info: Option<ProgramInfo>) {
        self.lock().program_updates.push((user_id, info));
    }
}

impl ChatDirectory for FakeDirectory {
    fn is_broadcast_channel(&self, channel_id: ChannelId) -> bool {
        self.lock()
            .channels
            .get(&channel_id)
            .is_some_and(|(broadcast, _)| *broadcast)
    }

    fn channel_permissions(&self, channel_id: ChannelId) -> ChannelPermissions {
        self.lock()
            .channels
            .get(&channel_id)
            .map(|(_, permissions)| *permissions)
            .unwrap_or_default()
    }

    fn on_get_chats(&self, chats: Vec<ChatStub>, source: &'static str) {
        let mut state = self.lock();
        for chat in chats {
            state.ingested_chats.push((chat.id, source));
        }
    }
}

impl StarAmounts for FakeDirectory {
    fn star_count(&self, amount: &StarsAmount) -> StarCount {
        amount.amount
    }
}
