//! Lists programs connected to a dialog.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{
    ResultHandler, clamp_total_count, decode, dispatch, fail_for_dialog, readable_stubs,
    report_malformed,
};
use crate::AFFILIATE_TARGET;
use crate::collaborators::Collaborators;
use crate::completion::CompletionSink;
use crate::cursor::{CursorPosition, PageCursor};
use crate::error::AffiliateError;
use crate::ids::DialogId;
use crate::program::{ConnectedProgram, ConnectedPrograms};
use crate::protocol::{
    ConnectedBotStarRef, ConnectedStarRefBots, GET_CONNECTED_STAR_REF_BOTS, InputPeer, WireRecord,
    WireRequest,
};
use crate::transport::RawResponse;

/// Cursor of the page after `entry`, taken from its raw fields when it did
/// not decode.
fn cursor_after(entry: &WireRecord<ConnectedBotStarRef>) -> PageCursor {
    match entry {
        WireRecord::Readable(record) => PageCursor::encode(record.date, &record.url),
        WireRecord::Unreadable { raw, .. } => {
            let date = raw
                .get("date")
                .and_then(Value::as_i64)
                .and_then(|date| i32::try_from(date).ok())
                .unwrap_or(0);
            let url = raw.get("url").and_then(Value::as_str).unwrap_or_default();
            PageCursor::encode(date, url)
        }
    }
}

pub(crate) struct ListConnectedHandler {
    collaborators: Collaborators,
    dialog_id: DialogId,
    sink: CompletionSink<ConnectedPrograms>,
}

impl ListConnectedHandler {
    pub(crate) const fn new(
        collaborators: Collaborators,
        dialog_id: DialogId,
        sink: CompletionSink<ConnectedPrograms>,
    ) -> Self {
        Self {
            collaborators,
            dialog_id,
            sink,
        }
    }

    /// Sends the request; `offset` is `None` for the first page.
    pub(crate) fn send(self, peer: InputPeer, offset: Option<CursorPosition>, limit: i32) {
        let (offset_date, offset_link) = offset
            .map_or((None, None), |CursorPosition { date, url }| {
                (Some(date), Some(url))
            });
        let request = WireRequest::GetConnectedStarRefBots {
            peer,
            offset_date,
            offset_link,
            limit,
        };
        let transport = Arc::clone(&self.collaborators.transport);
        dispatch(transport.as_ref(), request, self);
    }
}

impl ResultHandler for ListConnectedHandler {
    fn on_success(self, response: RawResponse) {
        let payload =
            match decode::<ConnectedStarRefBots>(&response, GET_CONNECTED_STAR_REF_BOTS) {
                Ok(payload) => payload,
                Err(error) => return self.on_failure(error),
            };
        debug!(
            target: AFFILIATE_TARGET,
            dialog = %self.dialog_id,
            count = payload.count,
            received = payload.connected_bots.len(),
            "received connected programs"
        );

        let ConnectedStarRefBots {
            count,
            connected_bots,
            users,
        } = payload;
        let stubs = readable_stubs(users, GET_CONNECTED_STAR_REF_BOTS);
        self.collaborators.users.on_get_users(stubs, GET_CONNECTED_STAR_REF_BOTS);

        // The cursor follows the last record seen, valid or not, so a bad
        // record can never pin the caller to the same page.
        let stars = self.collaborators.stars.as_ref();
        let mut next_cursor = PageCursor::start();
        let mut programs = Vec::with_capacity(connected_bots.len());
        for record in connected_bots {
            next_cursor = cursor_after(&record);
            match record
                .into_readable()
                .and_then(|decoded| ConnectedProgram::from_record(decoded, stars))
            {
                Ok(program) => programs.push(program),
                Err(reason) => {
                    report_malformed(self.dialog_id, GET_CONNECTED_STAR_REF_BOTS, &reason);
                }
            }
        }

        let total_count = clamp_total_count(count, programs.len(), GET_CONNECTED_STAR_REF_BOTS);
        self.sink.succeed(ConnectedPrograms {
            total_count,
            programs,
            next_cursor,
        });
    }

    fn on_failure(self, error: AffiliateError) {
        fail_for_dialog(
            &self.collaborators,
            self.dialog_id,
            GET_CONNECTED_STAR_REF_BOTS,
            self.sink,
            error,
        );
    }
}
