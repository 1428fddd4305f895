//! Shared fixtures and doubles for client tests.

mod fake_directory;
mod recording_transport;

use std::sync::Arc;

use rstest::fixture;
use serde_json::{Value, json};

use crate::collaborators::Collaborators;
use crate::ids::{ChannelId, DialogId, UserId};
use crate::manager::AffiliateManager;
use crate::ProgramLimits;

pub use events::{EventCounts, count_events};
pub use fake_directory::FakeDirectory;
pub use recording_transport::RecordingTransport;

/// The caller's own account.
pub const ME: UserId = UserId::new(1_000);
/// A bot the caller owns.
pub const OWNED_BOT: UserId = UserId::new(2_000);
/// A bot owned by someone else.
pub const FOREIGN_BOT: UserId = UserId::new(3_000);
/// A broadcast channel the caller administers.
pub const ADMINISTERED_CHANNEL: ChannelId = ChannelId::new(4_000);
/// A broadcast channel where the caller can't post.
pub const READ_ONLY_CHANNEL: ChannelId = ChannelId::new(5_000);

/// Manager wired to recording doubles.
pub struct Harness {
    pub manager: AffiliateManager,
    pub transport: RecordingTransport,
    pub directory: FakeDirectory,
}

impl Harness {
    pub fn new(directory: FakeDirectory) -> Self {
        let transport = RecordingTransport::new();
        let manager = AffiliateManager::new(
            collaborators_over(&transport, &directory),
            ProgramLimits::default(),
        );
        Self {
            manager,
            transport,
            directory,
        }
    }

    /// Fresh collaborator handles over the same doubles.
    pub fn collaborators(&self) -> Collaborators {
        collaborators_over(&self.transport, &self.directory)
    }
}

fn collaborators_over(transport: &RecordingTransport, directory: &FakeDirectory) -> Collaborators {
    Collaborators {
        transport: Arc::new(transport.clone()),
        dialogs: Arc::new(directory.clone()),
        users: Arc::new(directory.clone()),
        chats: Arc::new(directory.clone()),
        stars: Arc::new(directory.clone()),
    }
}

/// Directory populated with the standard cast of dialogs.
#[fixture]
pub fn directory() -> FakeDirectory {
    FakeDirectory::new(ME)
        .with_bot(OWNED_BOT, true)
        .with_bot(FOREIGN_BOT, false)
        .with_channel(ADMINISTERED_CHANNEL, true, true)
        .with_channel(READ_ONLY_CHANNEL, true, false)
}

#[fixture]
pub fn harness(directory: FakeDirectory) -> Harness {
    Harness::new(directory)
}

pub fn channel_dialog() -> DialogId {
    DialogId::Channel(ADMINISTERED_CHANNEL)
}

/// Wire record of a connected program.
pub fn connected_record(bot: i64, date: i32, url: &str) -> Value {
    json!({
        "url": url,
        "date": date,
        "bot_id": bot,
        "commission_permille": 150,
        "duration_months": 12,
        "participants": 3,
        "revenue": { "amount": 70, "nanos": 0 },
    })
}

/// Wire record of a suggested program.
pub fn program_record(bot: i64, commission_permille: i32) -> Value {
    json!({
        "bot_id": bot,
        "commission_permille": commission_permille,
        "duration_months": 6,
        "daily_revenue_per_user": { "amount": 12, "nanos": 500 },
    })
}

/// Wire user stub.
pub fn user_stub(id: i64) -> Value {
    json!({ "id": id, "access_hash": id * 10, "first_name": "Bot", "bot": true })
}
