//! Entry point for affiliate-program operations.
//!
//! [`AffiliateManager`] checks every call before anything is sent: the
//! dialog must be eligible, limits positive, program terms allowed and
//! cursors decodable, and every identifier must resolve to a wire address.
//! A call that fails a check resolves its sink before returning and never
//! reaches the transport. A call that passes hands its resolved inputs to a
//! one-shot handler, which resolves the sink once the backend answers.

use affiliate_config::ProgramLimits;
use tracing::{debug, warn};

use crate::AFFILIATE_TARGET;
use crate::collaborators::Collaborators;
use crate::completion::CompletionSink;
use crate::cursor::{CursorPosition, PageCursor, SearchOffset};
use crate::eligibility::Eligibility;
use crate::error::AffiliateError;
use crate::handlers::{
    ConnectProgramHandler, GetConnectedProgramHandler, ListConnectedHandler,
    ResolveReferralHandler, RevokeProgramHandler, SearchSuggestedHandler, UpdateProgramHandler,
};
use crate::ids::{DialogId, UserId};
use crate::program::{
    ChatReference, ConnectedProgram, ConnectedPrograms, FoundPrograms, ProgramParameters,
    SortOrder,
};
use crate::protocol::{InputPeer, InputUser};

/// Stateless facade over the affiliate-program backend methods.
///
/// # Example
///
/// ```no_run
/// use affiliate_client::{AffiliateManager, Collaborators, CompletionSink, DialogId};
/// use affiliate_client::{PageCursor, ProgramLimits};
///
/// fn first_page(collaborators: Collaborators, dialog_id: DialogId) {
///     let manager = AffiliateManager::new(collaborators, ProgramLimits::default());
///     let (sink, outcome) = CompletionSink::channel();
///     manager.get_connected_programs(dialog_id, &PageCursor::start(), 20, sink);
///     drop(outcome);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AffiliateManager {
    collaborators: Collaborators,
    limits: ProgramLimits,
}

impl AffiliateManager {
    /// Builds a manager over the injected collaborators.
    #[must_use]
    pub const fn new(collaborators: Collaborators, limits: ProgramLimits) -> Self {
        Self {
            collaborators,
            limits,
        }
    }

    /// Limits applied to program terms set through this manager.
    #[must_use]
    pub const fn limits(&self) -> ProgramLimits {
        self.limits
    }

    /// Sets the program a bot hosts; the unset sentinel ends it.
    pub fn set_program(
        &self,
        dialog_id: DialogId,
        parameters: ProgramParameters,
        sink: CompletionSink<()>,
    ) {
        match self.prepare_set_program(dialog_id, parameters) {
            Ok((bot_user_id, bot)) => {
                UpdateProgramHandler::new(self.collaborators.clone(), bot_user_id, sink)
                    .send(bot, parameters);
            }
            Err(error) => reject("set_program", dialog_id, sink, error),
        }
    }

    /// Resolves a bot through a referral link and materialises its dialog.
    pub fn resolve_referral(
        &self,
        username: impl Into<String>,
        referrer: impl Into<String>,
        sink: CompletionSink<ChatReference>,
    ) {
        let name = username.into();
        debug!(target: AFFILIATE_TARGET, username = %name, "resolving referral link");
        ResolveReferralHandler::new(self.collaborators.clone(), sink).send(name, referrer.into());
    }

    /// Searches programs the dialog may join.
    pub fn search_programs(
        &self,
        dialog_id: DialogId,
        sort_order: SortOrder,
        offset: &SearchOffset,
        limit: i32,
        sink: CompletionSink<FoundPrograms>,
    ) {
        match self.prepare_listing(dialog_id, limit) {
            Ok(peer) => SearchSuggestedHandler::new(self.collaborators.clone(), dialog_id, sink)
                .send(peer, sort_order, offset, limit),
            Err(error) => reject("search_programs", dialog_id, sink, error),
        }
    }

    /// Joins a bot's program on behalf of the dialog.
    pub fn connect_program(
        &self,
        dialog_id: DialogId,
        bot_user_id: UserId,
        sink: CompletionSink<ConnectedProgram>,
    ) {
        match self.prepare_bot_lookup(dialog_id, bot_user_id) {
            Ok((peer, bot)) => {
                ConnectProgramHandler::new(self.collaborators.clone(), dialog_id, sink)
                    .send(peer, bot);
            }
            Err(error) => reject("connect_program", dialog_id, sink, error),
        }
    }

    /// Revokes the dialog's referral link for a program.
    pub fn revoke_program(
        &self,
        dialog_id: DialogId,
        url: impl Into<String>,
        sink: CompletionSink<ConnectedProgram>,
    ) {
        match self.prepare_referable(dialog_id) {
            Ok(peer) => RevokeProgramHandler::new(self.collaborators.clone(), dialog_id, sink)
                .send(peer, url.into()),
            Err(error) => reject("revoke_program", dialog_id, sink, error),
        }
    }

    /// Fetches the dialog's connection to a bot's program, if any.
    pub fn get_connected_program(
        &self,
        dialog_id: DialogId,
        bot_user_id: UserId,
        sink: CompletionSink<Option<ConnectedProgram>>,
    ) {
        match self.prepare_bot_lookup(dialog_id, bot_user_id) {
            Ok((peer, bot)) => {
                GetConnectedProgramHandler::new(self.collaborators.clone(), dialog_id, sink)
                    .send(peer, bot);
            }
            Err(error) => reject("get_connected_program", dialog_id, sink, error),
        }
    }

    /// Lists the programs the dialog has joined, one page at a time.
    pub fn get_connected_programs(
        &self,
        dialog_id: DialogId,
        cursor: &PageCursor,
        limit: i32,
        sink: CompletionSink<ConnectedPrograms>,
    ) {
        match self.prepare_connected_page(dialog_id, cursor, limit) {
            Ok((peer, position)) => {
                ListConnectedHandler::new(self.collaborators.clone(), dialog_id, sink)
                    .send(peer, position, limit);
            }
            Err(error) => reject("get_connected_programs", dialog_id, sink, error),
        }
    }

    fn eligibility(&self) -> Eligibility<'_> {
        Eligibility::new(
            self.collaborators.dialogs.as_ref(),
            self.collaborators.users.as_ref(),
            self.collaborators.chats.as_ref(),
        )
    }

    fn prepare_set_program(
        &self,
        dialog_id: DialogId,
        parameters: ProgramParameters,
    ) -> Result<(UserId, InputUser), AffiliateError> {
        if !parameters.is_unset() && !parameters.is_allowed_by(&self.limits) {
            return Err(AffiliateError::InvalidParameters {
                commission_permille: parameters.commission_permille(),
                month_count: parameters.month_count(),
            });
        }
        self.eligibility().check_settable(dialog_id)?;
        let Some(bot_user_id) = dialog_id.user_id() else {
            return Err(AffiliateError::CannotHaveProgram { dialog_id });
        };
        let bot = self.input_user(bot_user_id)?;
        Ok((bot_user_id, bot))
    }

    fn prepare_referable(&self, dialog_id: DialogId) -> Result<InputPeer, AffiliateError> {
        self.eligibility().check_referable(dialog_id)?;
        self.input_peer(dialog_id)
    }

    fn prepare_listing(
        &self,
        dialog_id: DialogId,
        limit: i32,
    ) -> Result<InputPeer, AffiliateError> {
        self.eligibility().check_referable(dialog_id)?;
        ensure_positive(limit)?;
        self.input_peer(dialog_id)
    }

    fn prepare_bot_lookup(
        &self,
        dialog_id: DialogId,
        bot_user_id: UserId,
    ) -> Result<(InputPeer, InputUser), AffiliateError> {
        self.eligibility().check_referable(dialog_id)?;
        let bot = self.input_user(bot_user_id)?;
        let peer = self.input_peer(dialog_id)?;
        Ok((peer, bot))
    }

    fn prepare_connected_page(
        &self,
        dialog_id: DialogId,
        cursor: &PageCursor,
        limit: i32,
    ) -> Result<(InputPeer, Option<CursorPosition>), AffiliateError> {
        self.eligibility().check_referable(dialog_id)?;
        ensure_positive(limit)?;
        let position = if cursor.is_start() {
            None
        } else {
            Some(cursor.decode()?)
        };
        let peer = self.input_peer(dialog_id)?;
        Ok((peer, position))
    }

    fn input_user(&self, user_id: UserId) -> Result<InputUser, AffiliateError> {
        self.collaborators
            .users
            .input_user(user_id)
            .map_err(AffiliateError::Rejected)
    }

    fn input_peer(&self, dialog_id: DialogId) -> Result<InputPeer, AffiliateError> {
        self.collaborators
            .dialogs
            .input_peer(dialog_id)
            .ok_or(AffiliateError::NoAccess { dialog_id })
    }
}

const fn ensure_positive(limit: i32) -> Result<(), AffiliateError> {
    if limit <= 0 {
        return Err(AffiliateError::LimitNotPositive { limit });
    }
    Ok(())
}

fn reject<T>(
    operation: &'static str,
    dialog_id: DialogId,
    sink: CompletionSink<T>,
    error: AffiliateError,
) {
    warn!(
        target: AFFILIATE_TARGET,
        operation,
        dialog = %dialog_id,
        code = error.code(),
        %error,
        "rejected affiliate request"
    );
    sink.fail(error);
}
