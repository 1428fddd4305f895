//! Sets or clears the program a bot hosts.

use std::sync::Arc;

use tracing::{debug, error};

use super::{ResultHandler, decode, dispatch};
use crate::AFFILIATE_TARGET;
use crate::collaborators::Collaborators;
use crate::completion::CompletionSink;
use crate::error::AffiliateError;
use crate::ids::UserId;
use crate::program::{ProgramInfo, ProgramParameters};
use crate::protocol::{
    InputUser, StarRefProgram, UPDATE_STAR_REF_PROGRAM, WireRecord, WireRequest,
};
use crate::transport::RawResponse;

pub(crate) struct UpdateProgramHandler {
    collaborators: Collaborators,
    bot_user_id: UserId,
    sink: CompletionSink<()>,
}

impl UpdateProgramHandler {
    pub(crate) const fn new(
        collaborators: Collaborators,
        bot_user_id: UserId,
        sink: CompletionSink<()>,
    ) -> Self {
        Self {
            collaborators,
            bot_user_id,
            sink,
        }
    }

    pub(crate) fn send(self, bot: InputUser, parameters: ProgramParameters) {
        let request = WireRequest::UpdateStarRefProgram {
            bot,
            commission_permille: parameters.commission_permille(),
            duration_months: parameters.wire_duration(),
        };
        let transport = Arc::clone(&self.collaborators.transport);
        dispatch(transport.as_ref(), request, self);
    }
}

impl ResultHandler for UpdateProgramHandler {
    fn on_success(self, response: RawResponse) {
        let decoded = decode::<WireRecord<StarRefProgram>>(&response, UPDATE_STAR_REF_PROGRAM);
        let program = match decoded.map(WireRecord::into_readable) {
            Ok(Ok(program)) => program,
            Ok(Err(reason)) => {
                error!(
                    target: AFFILIATE_TARGET,
                    bot = %self.bot_user_id,
                    %reason,
                    "received malformed updated program"
                );
                return self.sink.succeed(());
            }
            Err(error) => return self.on_failure(error),
        };
        debug!(
            target: AFFILIATE_TARGET,
            bot = %self.bot_user_id,
            commission_permille = program.commission_permille,
            "received updated program"
        );

        // A zero commission is the backend's way of reporting an ended program.
        if program.commission_permille == 0 {
            self.collaborators
                .users
                .on_update_referral_program_info(self.bot_user_id, None);
        } else {
            match ProgramInfo::from_record(&program, self.collaborators.stars.as_ref()) {
                Ok(info) => self
                    .collaborators
                    .users
                    .on_update_referral_program_info(self.bot_user_id, Some(info)),
                Err(reason) => error!(
                    target: AFFILIATE_TARGET,
                    bot = %self.bot_user_id,
                    %reason,
                    "received malformed updated program"
                ),
            }
        }
        self.sink.succeed(());
    }

    fn on_failure(self, error: AffiliateError) {
        self.sink.fail(error);
    }
}
