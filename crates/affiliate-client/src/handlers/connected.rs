//! Handlers for operations that return exactly one connected program.
//!
//! Connecting, revoking and fetching a single connection all answer with a
//! list that must hold one record. Anything else is an invalid response,
//! except that fetching may legitimately find no connection at all.

use std::sync::Arc;

use tracing::debug;

use super::{
    ResultHandler, decode, dispatch, fail_for_dialog, readable_stubs, report_malformed,
};
use crate::AFFILIATE_TARGET;
use crate::collaborators::Collaborators;
use crate::completion::CompletionSink;
use crate::error::AffiliateError;
use crate::ids::DialogId;
use crate::program::ConnectedProgram;
use crate::protocol::{
    CONNECT_STAR_REF_BOT, ConnectedStarRefBots, EDIT_CONNECTED_STAR_REF_BOT,
    GET_CONNECTED_STAR_REF_BOT, InputPeer, InputUser, WireRequest,
};
use crate::transport::RawResponse;

/// Maps a response to at most one connected program.
fn single_program(
    collaborators: &Collaborators,
    dialog_id: DialogId,
    response: &RawResponse,
    method: &'static str,
) -> Result<Option<ConnectedProgram>, AffiliateError> {
    let ConnectedStarRefBots {
        connected_bots,
        users,
        ..
    } = decode::<ConnectedStarRefBots>(response, method)?;
    debug!(
        target: AFFILIATE_TARGET,
        dialog = %dialog_id,
        method,
        received = connected_bots.len(),
        "received connected programs"
    );
    if connected_bots.len() > 1 {
        return Err(AffiliateError::invalid_response(
            method,
            format!("expected one connected program, received {}", connected_bots.len()),
        ));
    }
    let Some(record) = connected_bots.into_iter().next() else {
        return Ok(None);
    };

    collaborators
        .users
        .on_get_users(readable_stubs(users, method), method);
    let stars = collaborators.stars.as_ref();
    record
        .into_readable()
        .and_then(|decoded| ConnectedProgram::from_record(decoded, stars))
        .map(Some)
        .map_err(|reason| {
            report_malformed(dialog_id, method, &reason);
            AffiliateError::invalid_response(method, reason.to_string())
        })
}

/// Like [`single_program`], but an empty response is invalid too.
fn required_program(
    collaborators: &Collaborators,
    dialog_id: DialogId,
    response: &RawResponse,
    method: &'static str,
) -> Result<ConnectedProgram, AffiliateError> {
    single_program(collaborators, dialog_id, response, method)?.ok_or_else(|| {
        AffiliateError::invalid_response(method, "expected one connected program, received 0")
    })
}

pub(crate) struct ConnectProgramHandler {
    collaborators: Collaborators,
    dialog_id: DialogId,
    sink: CompletionSink<ConnectedProgram>,
}

impl ConnectProgramHandler {
    pub(crate) const fn new(
        collaborators: Collaborators,
        dialog_id: DialogId,
        sink: CompletionSink<ConnectedProgram>,
    ) -> Self {
        Self {
            collaborators,
            dialog_id,
            sink,
        }
    }

    pub(crate) fn send(self, peer: InputPeer, bot: InputUser) {
        let request = WireRequest::ConnectStarRefBot { peer, bot };
        let transport = Arc::clone(&self.collaborators.transport);
        dispatch(transport.as_ref(), request, self);
    }
}

impl ResultHandler for ConnectProgramHandler {
    fn on_success(self, response: RawResponse) {
        match required_program(
            &self.collaborators,
            self.dialog_id,
            &response,
            CONNECT_STAR_REF_BOT,
        ) {
            Ok(program) => self.sink.succeed(program),
            Err(error) => self.on_failure(error),
        }
    }

    fn on_failure(self, error: AffiliateError) {
        fail_for_dialog(
            &self.collaborators,
            self.dialog_id,
            CONNECT_STAR_REF_BOT,
            self.sink,
            error,
        );
    }
}

pub(crate) struct RevokeProgramHandler {
    collaborators: Collaborators,
    dialog_id: DialogId,
    sink: CompletionSink<ConnectedProgram>,
}

impl RevokeProgramHandler {
    pub(crate) const fn new(
        collaborators: Collaborators,
        dialog_id: DialogId,
        sink: CompletionSink<ConnectedProgram>,
    ) -> Self {
        Self {
            collaborators,
            dialog_id,
            sink,
        }
    }

    pub(crate) fn send(self, peer: InputPeer, url: String) {
        let request = WireRequest::EditConnectedStarRefBot {
            revoked: true,
            peer,
            link: url,
        };
        let transport = Arc::clone(&self.collaborators.transport);
        dispatch(transport.as_ref(), request, self);
    }
}

impl ResultHandler for RevokeProgramHandler {
    fn on_success(self, response: RawResponse) {
        match required_program(
            &self.collaborators,
            self.dialog_id,
            &response,
            EDIT_CONNECTED_STAR_REF_BOT,
        ) {
            Ok(program) => self.sink.succeed(program),
            Err(error) => self.on_failure(error),
        }
    }

    fn on_failure(self, error: AffiliateError) {
        fail_for_dialog(
            &self.collaborators,
            self.dialog_id,
            EDIT_CONNECTED_STAR_REF_BOT,
            self.sink,
            error,
        );
    }
}

pub(crate) struct GetConnectedProgramHandler {
    collaborators: Collaborators,
    dialog_id: DialogId,
    sink: CompletionSink<Option<ConnectedProgram>>,
}

impl GetConnectedProgramHandler {
    pub(crate) const fn new(
        collaborators: Collaborators,
        dialog_id: DialogId,
        sink: CompletionSink<Option<ConnectedProgram>>,
    ) -> Self {
        Self {
            collaborators,
            dialog_id,
            sink,
        }
    }

    pub(crate) fn send(self, peer: InputPeer, bot: InputUser) {
        let request = WireRequest::GetConnectedStarRefBot { peer, bot };
        let transport = Arc::clone(&self.collaborators.transport);
        dispatch(transport.as_ref(), request, self);
    }
}

impl ResultHandler for GetConnectedProgramHandler {
    fn on_success(self, response: RawResponse) {
        match single_program(
            &self.collaborators,
            self.dialog_id,
            &response,
            GET_CONNECTED_STAR_REF_BOT,
        ) {
            Ok(program) => self.sink.succeed(program),
            Err(error) => self.on_failure(error),
        }
    }

    fn on_failure(self, error: AffiliateError) {
        fail_for_dialog(
            &self.collaborators,
            self.dialog_id,
            GET_CONNECTED_STAR_REF_BOT,
            self.sink,
            error,
        );
    }
}
