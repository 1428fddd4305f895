//! Resolves a bot through an affiliate referral link.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{ResultHandler, decode, dispatch, readable_stubs};
use crate::AFFILIATE_TARGET;
use crate::collaborators::Collaborators;
use crate::completion::CompletionSink;
use crate::error::AffiliateError;
use crate::program::ChatReference;
use crate::protocol::{RESOLVE_USERNAME, ResolvedPeer, WireRequest};
use crate::transport::RawResponse;

pub(crate) struct ResolveReferralHandler {
    collaborators: Collaborators,
    sink: CompletionSink<ChatReference>,
}

impl ResolveReferralHandler {
    pub(crate) const fn new(
        collaborators: Collaborators,
        sink: CompletionSink<ChatReference>,
    ) -> Self {
        Self {
            collaborators,
            sink,
        }
    }

    pub(crate) fn send(self, username: String, referrer: String) {
        let request = WireRequest::ResolveUsername {
            username,
            referer: Some(referrer),
        };
        let transport = Arc::clone(&self.collaborators.transport);
        dispatch(transport.as_ref(), request, self);
    }
}

impl ResultHandler for ResolveReferralHandler {
    fn on_success(self, response: RawResponse) {
        let ResolvedPeer { peer, chats, users } =
            match decode::<ResolvedPeer>(&response, RESOLVE_USERNAME) {
                Ok(resolved) => resolved,
                Err(error) => return self.on_failure(error),
            };
        debug!(target: AFFILIATE_TARGET, ?peer, "resolved referral link");
        self.collaborators
            .users
            .on_get_users(readable_stubs(users, RESOLVE_USERNAME), RESOLVE_USERNAME);
        self.collaborators
            .chats
            .on_get_chats(readable_stubs(chats, RESOLVE_USERNAME), RESOLVE_USERNAME);

        let dialog_id = peer.dialog_id();
        let known_user = dialog_id
            .user_id()
            .is_some_and(|user_id| self.collaborators.users.have_user(user_id));
        if !known_user {
            warn!(
                target: AFFILIATE_TARGET,
                dialog = %dialog_id,
                "referral link resolved to an unknown or non-user peer"
            );
            return self.on_failure(AffiliateError::ChatNotFound);
        }

        self.collaborators
            .dialogs
            .force_create_dialog(dialog_id, RESOLVE_USERNAME);
        self.sink.succeed(ChatReference::new(dialog_id));
    }

    fn on_failure(self, error: AffiliateError) {
        self.sink.fail(error);
    }
}
