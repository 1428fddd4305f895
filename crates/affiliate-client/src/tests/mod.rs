//! Crate-level end-to-end and BDD tests.

use rstest::rstest;
use serde_json::json;

use crate::completion::CompletionSink;
use crate::cursor::{PageCursor, SearchOffset};
use crate::error::{AffiliateError, RemoteError};
use crate::ids::{DialogId, UserId};
use crate::program::{ProgramParameters, SortOrder};
use crate::protocol::{
    CONNECT_STAR_REF_BOT, EDIT_CONNECTED_STAR_REF_BOT, GET_CONNECTED_STAR_REF_BOTS,
    GET_SUGGESTED_STAR_REF_BOTS, InputPeer, InputUser, RESOLVE_USERNAME, WireRequest,
};

pub(crate) mod support;

use support::{
    ADMINISTERED_CHANNEL, Harness, ME, OWNED_BOT, READ_ONLY_CHANNEL, channel_dialog,
    connected_record, count_events, harness, program_record, user_stub,
};

fn channel_peer() -> InputPeer {
    InputPeer::Channel {
        channel_id: ADMINISTERED_CHANNEL,
        access_hash: ADMINISTERED_CHANNEL.get() * 10,
    }
}

fn bot_input() -> InputUser {
    InputUser {
        user_id: OWNED_BOT,
        access_hash: OWNED_BOT.get() * 10,
    }
}

#[rstest]
fn setting_a_program_updates_the_bot(harness: Harness) {
    let (sink, outcome) = CompletionSink::channel();
    harness.manager.set_program(
        DialogId::User(OWNED_BOT),
        ProgramParameters::new(150, 12),
        sink,
    );

    assert_eq!(
        harness.transport.single_request(),
        WireRequest::UpdateStarRefProgram {
            bot: bot_input(),
            commission_permille: 150,
            duration_months: Some(12),
        }
    );
    harness
        .transport
        .reply(0, &program_record(OWNED_BOT.get(), 150));

    assert_eq!(outcome.try_recv().expect("resolved"), Ok(()));
    let updates = harness.directory.program_updates();
    assert_eq!(updates.len(), 1);
    let (bot, info) = updates.first().cloned().expect("one update");
    assert_eq!(bot, OWNED_BOT);
    assert_eq!(
        info.map(|program| program.parameters()),
        Some(ProgramParameters::new(150, 6))
    );
}

#[rstest]
fn ending_a_program_sends_zero_commission(harness: Harness) {
    let (sink, outcome) = CompletionSink::channel();
    harness
        .manager
        .set_program(DialogId::User(OWNED_BOT), ProgramParameters::default(), sink);

    assert_eq!(
        harness.transport.single_request(),
        WireRequest::UpdateStarRefProgram {
            bot: bot_input(),
            commission_permille: 0,
            duration_months: None,
        }
    );
    harness
        .transport
        .reply(0, &json!({ "bot_id": OWNED_BOT.get(), "commission_permille": 0 }));

    assert_eq!(outcome.try_recv().expect("resolved"), Ok(()));
    assert_eq!(harness.directory.program_updates(), vec![(OWNED_BOT, None)]);
}

#[rstest]
fn mistyped_updated_programs_are_logged_not_forwarded(harness: Harness) {
    let (sink, outcome) = CompletionSink::channel();
    harness.manager.set_program(
        DialogId::User(OWNED_BOT),
        ProgramParameters::new(100, 12),
        sink,
    );

    let (result, counts) = count_events(|| {
        harness.transport.reply(
            0,
            &json!({ "bot_id": OWNED_BOT.get(), "commission_permille": "lots" }),
        );
        outcome.try_recv().expect("resolved")
    });

    assert_eq!(result, Ok(()));
    assert_eq!(counts.errors, 1);
    assert!(harness.directory.program_updates().is_empty());
}

#[rstest]
fn referral_links_materialise_the_bot_dialog(harness: Harness) {
    let bot = UserId::new(6_000);
    let (sink, outcome) = CompletionSink::channel();
    harness.manager.resolve_referral("shop_bot", "_tgr_abc", sink);

    assert_eq!(
        harness.transport.single_request(),
        WireRequest::ResolveUsername {
            username: "shop_bot".to_owned(),
            referer: Some("_tgr_abc".to_owned()),
        }
    );
    harness.transport.reply(
        0,
        &json!({
            "peer": { "type": "user", "user_id": bot.get() },
            "users": [user_stub(bot.get())],
        }),
    );

    let reference = outcome.try_recv().expect("resolved").expect("succeeded");
    assert_eq!(reference.dialog_id(), DialogId::User(bot));
    assert_eq!(harness.directory.created_dialogs(), vec![DialogId::User(bot)]);
    assert_eq!(
        harness.directory.ingested_users(),
        vec![(bot, RESOLVE_USERNAME)]
    );
}

#[rstest]
#[case::channel(json!({ "peer": { "type": "channel", "channel_id": 8 }, "chats": [{ "id": 8 }] }))]
#[case::unknown_user(json!({ "peer": { "type": "user", "user_id": 6_001 } }))]
fn referral_links_must_resolve_to_known_users(
    harness: Harness,
    #[case] payload: serde_json::Value,
) {
    let (sink, outcome) = CompletionSink::channel();
    harness.manager.resolve_referral("shop_bot", "_tgr_abc", sink);
    harness.transport.reply(0, &payload);

    let error = outcome.try_recv().expect("resolved").expect_err("failed");
    assert_eq!(error, AffiliateError::ChatNotFound);
    assert!(harness.directory.created_dialogs().is_empty());
}

#[rstest]
#[case(SortOrder::Profitability, false, false)]
#[case(SortOrder::Date, true, false)]
#[case(SortOrder::Revenue, false, true)]
fn sort_order_sets_at_most_one_flag(
    harness: Harness,
    #[case] sort_order: SortOrder,
    #[case] by_date: bool,
    #[case] by_revenue: bool,
) {
    let (sink, _outcome) = CompletionSink::channel();
    harness.manager.search_programs(
        channel_dialog(),
        sort_order,
        &SearchOffset::new("opaque-7"),
        25,
        sink,
    );

    assert_eq!(
        harness.transport.single_request(),
        WireRequest::GetSuggestedStarRefBots {
            order_by_revenue: by_revenue,
            order_by_date: by_date,
            peer: channel_peer(),
            offset: "opaque-7".to_owned(),
            limit: 25,
        }
    );
}

#[rstest]
fn malformed_suggestions_are_dropped_and_logged_each(harness: Harness) {
    let (sink, outcome) = CompletionSink::channel();
    harness.manager.search_programs(
        DialogId::User(ME),
        SortOrder::default(),
        &SearchOffset::start(),
        10,
        sink,
    );

    let (result, counts) = count_events(|| {
        harness.transport.reply(
            0,
            &json!({
                "count": 40,
                "suggested_bots": [
                    program_record(11, 100),
                    program_record(0, 100),
                    program_record(12, 0),
                    program_record(13, 300),
                ],
                "users": [user_stub(11), user_stub(13)],
                "next_offset": "page-2",
            }),
        );
        outcome.try_recv().expect("resolved")
    });

    let found = result.expect("succeeded");
    assert_eq!(found.programs.len(), 2);
    assert_eq!(found.total_count, 40);
    assert_eq!(found.next_offset, SearchOffset::new("page-2"));
    assert_eq!(counts.errors, 2);
    assert_eq!(
        harness.directory.ingested_users(),
        vec![
            (UserId::new(11), GET_SUGGESTED_STAR_REF_BOTS),
            (UserId::new(13), GET_SUGGESTED_STAR_REF_BOTS),
        ]
    );
}

#[rstest]
fn under_reported_totals_are_clamped(harness: Harness) {
    let (sink, outcome) = CompletionSink::channel();
    harness.manager.search_programs(
        DialogId::User(ME),
        SortOrder::Revenue,
        &SearchOffset::start(),
        10,
        sink,
    );
    harness.transport.reply(
        0,
        &json!({
            "count": 1,
            "suggested_bots": [program_record(11, 100), program_record(12, 200), program_record(13, 300)],
        }),
    );

    let found = outcome.try_recv().expect("resolved").expect("succeeded");
    assert_eq!(found.total_count, 3);
    assert!(found.next_offset.is_empty());
}

/// Sends `operation` for the administered channel and replies with `records`.
fn single_record_outcome(
    operation: &str,
    records: Vec<serde_json::Value>,
) -> (Harness, Result<Option<crate::program::ConnectedProgram>, AffiliateError>) {
    let harness = Harness::new(support::directory());
    let dialog_id = channel_dialog();
    let (sink, outcome) = CompletionSink::channel();
    match operation {
        "connect" => harness.manager.connect_program(
            dialog_id,
            OWNED_BOT,
            CompletionSink::new(move |result| sink.resolve(result.map(Some))),
        ),
        "revoke" => harness.manager.revoke_program(
            dialog_id,
            "https://t.me/shop_bot?start=_tgr_x",
            CompletionSink::new(move |result| sink.resolve(result.map(Some))),
        ),
        "get" => harness
            .manager
            .get_connected_program(dialog_id, OWNED_BOT, sink),
        other => panic!("unknown operation {other}"),
    }
    harness.transport.reply(
        0,
        &json!({ "count": records.len(), "connected_bots": records }),
    );
    let result = outcome.try_recv().expect("resolved");
    (harness, result)
}

#[rstest]
#[case("connect")]
#[case("revoke")]
#[case("get")]
fn one_record_is_a_connected_program(#[case] operation: &str) {
    let (_harness, result) = single_record_outcome(
        operation,
        vec![connected_record(OWNED_BOT.get(), 1_700_000_000, "https://t.me/x")],
    );
    let program = result.expect("succeeded").expect("present");
    assert_eq!(program.url(), "https://t.me/x");
    assert_eq!(program.bot_user_id(), OWNED_BOT);
}

#[rstest]
#[case("connect", 0)]
#[case("revoke", 0)]
#[case("connect", 2)]
#[case("revoke", 2)]
#[case("get", 2)]
fn wrong_record_counts_are_invalid_responses(#[case] operation: &str, #[case] records: usize) {
    let payload = (0..records)
        .map(|index| {
            let date = 1_700_000_000 + i32::try_from(index).expect("small index");
            connected_record(OWNED_BOT.get(), date, "https://t.me/x")
        })
        .collect();
    let (harness, result) = single_record_outcome(operation, payload);

    let error = result.expect_err("failed");
    assert!(
        matches!(error, AffiliateError::InvalidResponse { .. }),
        "got {error:?}"
    );
    assert_eq!(error.code(), 500);
    assert_eq!(harness.directory.dialog_errors().len(), 1);
}

#[test]
fn missing_connection_is_absent_not_an_error() {
    let (harness, result) = single_record_outcome("get", Vec::new());
    assert_eq!(result, Ok(None));
    assert!(harness.directory.dialog_errors().is_empty());
}

#[test]
fn a_malformed_single_record_is_an_invalid_response() {
    let (_harness, result) =
        single_record_outcome("connect", vec![connected_record(OWNED_BOT.get(), 1, "")]);
    assert!(
        matches!(result, Err(AffiliateError::InvalidResponse { method: CONNECT_STAR_REF_BOT, .. })),
        "got {result:?}"
    );
}

#[rstest]
fn revoking_edits_the_link(harness: Harness) {
    let (sink, _outcome) = CompletionSink::channel();
    harness
        .manager
        .revoke_program(channel_dialog(), "https://t.me/shop_bot?start=_tgr_x", sink);

    let request = harness.transport.single_request();
    assert_eq!(request.method(), EDIT_CONNECTED_STAR_REF_BOT);
    assert_eq!(
        request,
        WireRequest::EditConnectedStarRefBot {
            revoked: true,
            peer: channel_peer(),
            link: "https://t.me/shop_bot?start=_tgr_x".to_owned(),
        }
    );
}

#[rstest]
fn listing_a_channel_without_rights_fails_before_dispatch(harness: Harness) {
    let dialog_id = DialogId::Channel(READ_ONLY_CHANNEL);
    let (sink, outcome) = CompletionSink::channel();
    harness.manager.get_connected_programs(
        dialog_id,
        &PageCursor::new("1700000000 https://t.me/x"),
        20,
        sink,
    );

    assert_eq!(harness.transport.request_count(), 0);
    let error = outcome.try_recv().expect("resolved").expect_err("failed");
    assert_eq!(error, AffiliateError::NotEnoughRights { dialog_id });
}

#[rstest]
#[case::valid_last_record(OWNED_BOT.get())]
#[case::invalid_last_record(0)]
fn next_cursor_follows_the_last_record(harness: Harness, #[case] last_bot: i64) {
    let (sink, outcome) = CompletionSink::channel();
    harness.manager.get_connected_programs(
        channel_dialog(),
        &PageCursor::new("1700000000 https://t.me/x"),
        20,
        sink,
    );

    assert_eq!(
        harness.transport.single_request(),
        WireRequest::GetConnectedStarRefBots {
            peer: channel_peer(),
            offset_date: Some(1_700_000_000),
            offset_link: Some("https://t.me/x".to_owned()),
            limit: 20,
        }
    );
    harness.transport.reply(
        0,
        &json!({
            "count": 2,
            "connected_bots": [
                connected_record(OWNED_BOT.get(), 1_700_000_010, "https://t.me/w"),
                connected_record(last_bot, 1_700_000_050, "https://t.me/y"),
            ],
        }),
    );

    let page = outcome.try_recv().expect("resolved").expect("succeeded");
    assert_eq!(page.next_cursor.as_str(), "1700000050 https://t.me/y");
    assert_eq!(page.programs.len(), if last_bot == 0 { 1 } else { 2 });
}

#[rstest]
fn mistyped_records_are_dropped_without_failing_the_page(harness: Harness) {
    let (sink, outcome) = CompletionSink::channel();
    harness
        .manager
        .get_connected_programs(channel_dialog(), &PageCursor::start(), 20, sink);

    let (result, counts) = count_events(|| {
        harness.transport.reply(
            0,
            &json!({
                "count": 2,
                "connected_bots": [
                    connected_record(OWNED_BOT.get(), 1_700_000_010, "https://t.me/w"),
                    {
                        "url": null,
                        "date": 1_700_000_050,
                        "bot_id": OWNED_BOT.get(),
                        "commission_permille": 150,
                        "participants": 3,
                        "revenue": { "amount": 70, "nanos": 0 },
                    },
                ],
                "users": [user_stub(OWNED_BOT.get()), { "id": "not-a-number" }],
            }),
        );
        outcome.try_recv().expect("resolved")
    });

    let page = result.expect("succeeded");
    assert_eq!(page.programs.len(), 1);
    assert_eq!(page.total_count, 2);
    assert_eq!(page.next_cursor.as_str(), "1700000050 ");
    assert_eq!(counts.errors, 2);
    assert_eq!(
        harness.directory.ingested_users(),
        vec![(OWNED_BOT, GET_CONNECTED_STAR_REF_BOTS)]
    );
}

#[rstest]
fn negative_dates_never_produce_an_undecodable_cursor(harness: Harness) {
    let (sink, outcome) = CompletionSink::channel();
    harness
        .manager
        .get_connected_programs(channel_dialog(), &PageCursor::start(), 20, sink);
    harness.transport.reply(
        0,
        &json!({
            "count": 2,
            "connected_bots": [
                connected_record(OWNED_BOT.get(), 1_700_000_010, "https://t.me/w"),
                connected_record(OWNED_BOT.get(), -1, "https://t.me/bad"),
            ],
        }),
    );

    let page = outcome.try_recv().expect("resolved").expect("succeeded");
    assert_eq!(page.programs.len(), 1);
    assert_eq!(page.next_cursor.as_str(), "0 https://t.me/bad");

    let (next_sink, next) = CompletionSink::channel();
    harness
        .manager
        .get_connected_programs(channel_dialog(), &page.next_cursor, 20, next_sink);
    assert!(next.try_recv().is_err(), "rejected before dispatch");
    assert_eq!(harness.transport.request_count(), 2);
}

#[rstest]
fn first_page_omits_offsets_and_empty_pages_end_the_listing(harness: Harness) {
    let (sink, outcome) = CompletionSink::channel();
    harness
        .manager
        .get_connected_programs(DialogId::User(ME), &PageCursor::start(), 5, sink);

    assert_eq!(
        harness.transport.single_request(),
        WireRequest::GetConnectedStarRefBots {
            peer: InputPeer::SelfPeer,
            offset_date: None,
            offset_link: None,
            limit: 5,
        }
    );
    harness.transport.reply(0, &json!({ "count": 0 }));

    let page = outcome.try_recv().expect("resolved").expect("succeeded");
    assert!(page.programs.is_empty());
    assert!(page.next_cursor.is_start());
    assert_eq!(page.total_count, 0);
}

#[rstest]
fn undecodable_replies_fail_the_call(harness: Harness) {
    let (sink, outcome) = CompletionSink::channel();
    harness
        .manager
        .connect_program(channel_dialog(), OWNED_BOT, sink);
    harness.transport.reply_raw(0, b"{ truncated");

    let error = outcome.try_recv().expect("resolved").expect_err("failed");
    assert_eq!(error.code(), 500);
}

#[rstest]
fn replies_may_arrive_out_of_order(harness: Harness) {
    let (first_sink, first) = CompletionSink::channel();
    let (second_sink, second) = CompletionSink::channel();
    harness
        .manager
        .get_connected_program(channel_dialog(), OWNED_BOT, first_sink);
    harness
        .manager
        .get_connected_programs(channel_dialog(), &PageCursor::start(), 3, second_sink);

    harness
        .transport
        .fail(1, RemoteError::new(500, "INTERNAL"));
    assert!(first.try_recv().is_err(), "first call resolved early");
    assert_eq!(
        second.try_recv().expect("resolved"),
        Err(AffiliateError::Transport(RemoteError::new(500, "INTERNAL")))
    );

    harness.transport.reply(0, &json!({ "count": 0 }));
    assert_eq!(first.try_recv().expect("resolved"), Ok(None));
}
