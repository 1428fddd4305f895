//! One-shot handlers for the backend methods behind each operation.
//!
//! A handler is built with its collaborators and a [`CompletionSink`], sends
//! exactly one request and is consumed by whichever of
//! [`ResultHandler::on_success`] or [`ResultHandler::on_failure`] the
//! transport triggers. Handlers receive inputs that are already validated and
//! resolved; all checks happen in [`crate::AffiliateManager`].
//!
//! [`CompletionSink`]: crate::CompletionSink

mod connected;
mod connected_list;
mod resolve_referral;
mod suggested;
mod update_program;

use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::AFFILIATE_TARGET;
use crate::collaborators::Collaborators;
use crate::completion::CompletionSink;
use crate::error::AffiliateError;
use crate::ids::DialogId;
use crate::program::MalformedRecord;
use crate::protocol::{WireRecord, WireRequest};
use crate::transport::{RawResponse, Transport};

pub(crate) use connected::{
    ConnectProgramHandler, GetConnectedProgramHandler, RevokeProgramHandler,
};
pub(crate) use connected_list::ListConnectedHandler;
pub(crate) use resolve_referral::ResolveReferralHandler;
pub(crate) use suggested::SearchSuggestedHandler;
pub(crate) use update_program::UpdateProgramHandler;

/// Receives the outcome of the single request a handler sent.
pub(crate) trait ResultHandler: Send + Sized + 'static {
    /// Maps a raw response and resolves the handler's sink.
    fn on_success(self, response: RawResponse);

    /// Resolves the handler's sink with the error.
    fn on_failure(self, error: AffiliateError);
}

/// Sends `request` and routes its outcome to `handler`.
pub(crate) fn dispatch<H: ResultHandler>(
    transport: &dyn Transport,
    request: WireRequest,
    handler: H,
) {
    let method = request.method();
    debug!(target: AFFILIATE_TARGET, method, "sending request");
    transport.send(
        request,
        Box::new(move |outcome| match outcome {
            Ok(response) => handler.on_success(response),
            Err(remote) => {
                debug!(target: AFFILIATE_TARGET, method, error = %remote, "request failed");
                handler.on_failure(AffiliateError::Transport(remote));
            }
        }),
    );
}

/// Decodes the payload of `method` from a raw response.
pub(crate) fn decode<T: DeserializeOwned>(
    response: &RawResponse,
    method: &'static str,
) -> Result<T, AffiliateError> {
    serde_json::from_slice(response.as_bytes()).map_err(|source| {
        error!(target: AFFILIATE_TARGET, method, error = %source, "undecodable response");
        AffiliateError::invalid_response(method, source.to_string())
    })
}

/// Raises an under-reported total to the number of records received.
pub(crate) fn clamp_total_count(reported: i32, received: usize, method: &'static str) -> i32 {
    let valid = i32::try_from(received).unwrap_or(i32::MAX);
    if reported < valid {
        warn!(
            target: AFFILIATE_TARGET,
            method,
            reported,
            received = valid,
            "total count below received programs"
        );
        return valid;
    }
    reported
}

/// Logs a record that was dropped from a response.
pub(crate) fn report_malformed(
    dialog_id: DialogId,
    method: &'static str,
    reason: &MalformedRecord,
) {
    error!(
        target: AFFILIATE_TARGET,
        dialog = %dialog_id,
        method,
        %reason,
        "dropping malformed affiliate program"
    );
}

/// Keeps the embedded stubs that decoded, logging each one that did not.
pub(crate) fn readable_stubs<T>(stubs: Vec<WireRecord<T>>, method: &'static str) -> Vec<T> {
    stubs
        .into_iter()
        .filter_map(|stub| {
            stub.into_readable()
                .inspect_err(|reason| {
                    error!(target: AFFILIATE_TARGET, method, %reason, "dropping unreadable stub");
                })
                .ok()
        })
        .collect()
}

/// Records a failure against the addressed dialog, then resolves the sink.
pub(crate) fn fail_for_dialog<T>(
    collaborators: &Collaborators,
    dialog_id: DialogId,
    method: &'static str,
    sink: CompletionSink<T>,
    error: AffiliateError,
) {
    collaborators.dialogs.on_dialog_error(dialog_id, &error, method);
    sink.fail(error);
}
