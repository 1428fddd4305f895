//! Client layer for affiliate ("referral") programs.
//!
//! Bots host affiliate programs that pay a commission on revenue brought in
//! through referral links; users, bots and broadcast channels join those
//! programs to receive links of their own. This crate turns the operations
//! around them into backend requests and turns the backend's answers into
//! checked domain values.
//!
//! # Architecture
//!
//! [`AffiliateManager`] is the entry point. It validates each call against
//! the dialog's [`Eligibility`] and the configured [`ProgramLimits`], resolves
//! identifiers through the injected [`Collaborators`] and hands the request
//! to a one-shot handler. The handler sends one [`WireRequest`] through the
//! [`Transport`] and resolves the caller's [`CompletionSink`] exactly once,
//! dropping and logging any malformed record in the response.
//!
//! Nothing is cached here. Users and chats embedded in responses are passed
//! on to the directories, which own that state.
//!
//! # Example
//!
//! ```rust,no_run
//! use affiliate_client::{AffiliateManager, Collaborators, CompletionSink};
//! use affiliate_client::{DialogId, ProgramParameters, UserId};
//! use affiliate_config::Config;
//!
//! fn start_program(collaborators: Collaborators) -> Result<(), Box<dyn std::error::Error>> {
//!     let limits = Config::default().program_limits()?;
//!     let manager = AffiliateManager::new(collaborators, limits);
//!     let (sink, outcome) = CompletionSink::channel();
//!     let bot = DialogId::User(UserId::new(42));
//!     manager.set_program(bot, ProgramParameters::new(100, 12), sink);
//!     // The transport delivers the reply later.
//!     drop(outcome);
//!     Ok(())
//! }
//! ```

pub mod collaborators;
pub mod completion;
pub mod cursor;
pub mod eligibility;
pub mod error;
mod handlers;
pub mod ids;
pub mod manager;
pub mod program;
pub mod protocol;
pub mod telemetry;
pub mod transport;

#[cfg(test)]
mod tests;

/// Tracing target of every event emitted by this crate.
pub const AFFILIATE_TARGET: &str = "affiliate_client";

pub use affiliate_config::ProgramLimits;

pub use self::collaborators::{
    BotData, ChannelPermissions, ChatDirectory, Collaborators, DialogAccess, StarAmounts,
    UserDirectory,
};
pub use self::completion::CompletionSink;
pub use self::cursor::{CursorParseError, CursorPosition, PageCursor, SearchOffset};
pub use self::eligibility::Eligibility;
pub use self::error::{AffiliateError, RemoteError};
pub use self::ids::{ChannelId, ChatId, DialogId, SecretChatId, UserId};
pub use self::manager::AffiliateManager;
pub use self::program::{
    ChatReference, ConnectedProgram, ConnectedPrograms, FoundPrograms, MalformedRecord,
    ProgramInfo, ProgramParameters, SortOrder, StarCount, SuggestedProgram,
};
pub use self::protocol::{InputPeer, InputUser, WireRequest};
pub use self::transport::{RawResponse, ReplySink, Transport};
