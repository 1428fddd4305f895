//! Searches programs a dialog may join.

use std::sync::Arc;

use tracing::debug;

use super::{
    ResultHandler, clamp_total_count, decode, dispatch, fail_for_dialog, readable_stubs,
    report_malformed,
};
use crate::AFFILIATE_TARGET;
use crate::collaborators::Collaborators;
use crate::completion::CompletionSink;
use crate::cursor::SearchOffset;
use crate::error::AffiliateError;
use crate::ids::DialogId;
use crate::program::{FoundPrograms, SortOrder, SuggestedProgram};
use crate::protocol::{
    GET_SUGGESTED_STAR_REF_BOTS, InputPeer, SuggestedStarRefBots, WireRequest,
};
use crate::transport::RawResponse;

pub(crate) struct SearchSuggestedHandler {
    collaborators: Collaborators,
    dialog_id: DialogId,
    sink: CompletionSink<FoundPrograms>,
}

impl SearchSuggestedHandler {
    pub(crate) const fn new(
        collaborators: Collaborators,
        dialog_id: DialogId,
        sink: CompletionSink<FoundPrograms>,
    ) -> Self {
        Self {
            collaborators,
            dialog_id,
            sink,
        }
    }

    pub(crate) fn send(
        self,
        peer: InputPeer,
        sort_order: SortOrder,
        offset: &SearchOffset,
        limit: i32,
    ) {
        let (order_by_date, order_by_revenue) = match sort_order {
            SortOrder::Profitability => (false, false),
            SortOrder::Date => (true, false),
            SortOrder::Revenue => (false, true),
        };
        let request = WireRequest::GetSuggestedStarRefBots {
            order_by_revenue,
            order_by_date,
            peer,
            offset: offset.as_str().to_owned(),
            limit,
        };
        let transport = Arc::clone(&self.collaborators.transport);
        dispatch(transport.as_ref(), request, self);
    }
}

impl ResultHandler for SearchSuggestedHandler {
    fn on_success(self, response: RawResponse) {
        let payload =
            match decode::<SuggestedStarRefBots>(&response, GET_SUGGESTED_STAR_REF_BOTS) {
                Ok(payload) => payload,
                Err(error) => return self.on_failure(error),
            };
        debug!(
            target: AFFILIATE_TARGET,
            dialog = %self.dialog_id,
            count = payload.count,
            received = payload.suggested_bots.len(),
            "received suggested programs"
        );

        let SuggestedStarRefBots {
            count,
            suggested_bots,
            users,
            next_offset,
        } = payload;
        let stubs = readable_stubs(users, GET_SUGGESTED_STAR_REF_BOTS);
        self.collaborators.users.on_get_users(stubs, GET_SUGGESTED_STAR_REF_BOTS);

        let stars = self.collaborators.stars.as_ref();
        let programs: Vec<SuggestedProgram> = suggested_bots
            .into_iter()
            .filter_map(|record| {
                record
                    .into_readable()
                    .and_then(|decoded| SuggestedProgram::from_record(&decoded, stars))
                    .inspect_err(|reason| {
                        report_malformed(self.dialog_id, GET_SUGGESTED_STAR_REF_BOTS, reason);
                    })
                    .ok()
            })
            .collect();

        let total_count = clamp_total_count(count, programs.len(), GET_SUGGESTED_STAR_REF_BOTS);
        self.sink.succeed(FoundPrograms {
            total_count,
            programs,
            next_offset: SearchOffset::new(next_offset.unwrap_or_default()),
        });
    }

    fn on_failure(self, error: AffiliateError) {
        fail_for_dialog(
            &self.collaborators,
            self.dialog_id,
            GET_SUGGESTED_STAR_REF_BOTS,
            self.sink,
            error,
        );
    }
}
