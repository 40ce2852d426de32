//! Integration tests for the dispatch pipeline: tokenizing, rights gate,
//! argument rewrite, validation and handler invocation.

mod common;

use chatgate::{ArgPattern, ChatUser, CmdFlags, CommandRegistry};
use common::{RecordingHandler, TestRouter, broadcaster, moderator, subscriber, viewer, vip};
use std::time::Duration;

fn single(flags: CmdFlags, pattern: ArgPattern, handler: &RecordingHandler) -> TestRouter {
    let mut registry = CommandRegistry::new();
    registry
        .command(["add"])
        .action(handler.clone())
        .help(flags, "usage: %alias%<song id>", pattern)
        .register()
        .unwrap();
    TestRouter::new(registry)
}

fn every_role_combination() -> Vec<ChatUser> {
    (0u8..16)
        .map(|bits| ChatUser {
            display_name: format!("user{bits}"),
            is_broadcaster: bits & 1 != 0,
            is_moderator: bits & 2 != 0,
            is_subscriber: bits & 4 != 0,
            is_vip: bits & 8 != 0,
        })
        .collect()
}

#[tokio::test]
async fn test_digit_ends_command_name() {
    let handler = RecordingHandler::new();
    let t = single(CmdFlags::EVERYONE, ArgPattern::named("song_id").unwrap(), &handler);

    let said = t.say(&viewer(), "!add4334-333").await;
    assert!(said.is_empty());

    let calls = handler.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].alias, "!add");
    assert_eq!(calls[0].param, "4334-333");
}

#[tokio::test]
async fn test_ordinary_chat_is_ignored() {
    let handler = RecordingHandler::new();
    let t = single(CmdFlags::EVERYONE, ArgPattern::anything(), &handler);

    for line in ["hello everyone", "", "  !add 1", "!unknown 1", "add 1", "1234"] {
        assert!(t.say(&viewer(), line).await.is_empty(), "{line}");
    }
    assert_eq!(handler.count().await, 0);
}

#[tokio::test]
async fn test_everyone_authorizes_every_role_combination() {
    let handler = RecordingHandler::new();
    let t = single(CmdFlags::EVERYONE, ArgPattern::anything(), &handler);

    let users = every_role_combination();
    for user in &users {
        assert!(t.say(user, "!add x").await.is_empty());
    }
    assert_eq!(handler.count().await, users.len());
}

#[tokio::test]
async fn test_broadcaster_only_admits_broadcaster_or_allow_list() {
    let handler = RecordingHandler::new();
    let mut registry = CommandRegistry::new();
    registry
        .command(["add"])
        .action(handler.clone())
        .help(CmdFlags::BROADCASTER_ONLY, "usage: %alias%", ArgPattern::anything())
        .allow("friends")
        .register()
        .unwrap();
    let t = TestRouter::new(registry);
    t.lists.add("friends", "user6");

    for user in every_role_combination() {
        let said = t.say(&user, "!add x").await;
        let admitted = user.is_broadcaster || user.display_name == "user6";
        if admitted {
            assert!(said.is_empty(), "{}", user.display_name);
        } else {
            assert_eq!(said, vec!["!add is restricted to Broadcaster"], "{}", user.display_name);
        }
    }

    let callers: Vec<String> = handler.calls().await.into_iter().map(|c| c.user).collect();
    assert_eq!(callers.len(), 9);
    assert!(callers.contains(&"user6".to_string()));
}

#[tokio::test]
async fn test_role_bits_admit_matching_roles() {
    let handler = RecordingHandler::new();
    let t = single(
        CmdFlags::MODERATOR | CmdFlags::SUBSCRIBER | CmdFlags::VIP,
        ArgPattern::anything(),
        &handler,
    );

    for user in [moderator(), subscriber(), vip()] {
        assert!(t.say(&user, "!add x").await.is_empty());
    }
    assert_eq!(
        t.say(&broadcaster(), "!add x").await,
        vec!["!add is restricted to Sub, Mod, VIP"]
    );
    assert_eq!(handler.count().await, 3);
}

#[tokio::test]
async fn test_restriction_message_hides_behavior_bits() {
    let handler = RecordingHandler::new();
    let t = single(
        CmdFlags::MOD | CmdFlags::LOG | CmdFlags::HELP_LINK,
        ArgPattern::anything(),
        &handler,
    );

    assert_eq!(t.say(&viewer(), "!add 1").await, vec!["!add is restricted to Mod, Broadcaster"]);
}

#[tokio::test]
async fn test_silent_preflight_suppresses_restriction() {
    let handler = RecordingHandler::new();
    let t = single(
        CmdFlags::BROADCASTER_ONLY | CmdFlags::SILENT_PREFLIGHT,
        ArgPattern::anything(),
        &handler,
    );

    assert!(t.say(&viewer(), "!add 1").await.is_empty());
    assert_eq!(handler.count().await, 0);
}

#[tokio::test]
async fn test_bypass_rights_lets_anyone_through() {
    let handler = RecordingHandler::new();
    let t = single(CmdFlags::BROADCASTER | CmdFlags::HELP, ArgPattern::anything(), &handler);

    assert!(t.say(&viewer(), "!add 1").await.is_empty());
    assert_eq!(handler.count().await, 1);
}

#[tokio::test]
async fn test_disabled_command_is_unreachable() {
    let handler = RecordingHandler::new();
    let t = single(
        CmdFlags::EVERYONE | CmdFlags::DISABLED,
        ArgPattern::anything(),
        &handler,
    );

    assert!(t.say(&viewer(), "!add 1").await.is_empty());
    assert!(t.say(&broadcaster(), "!add 1").await.is_empty());
    assert!(t.say(&broadcaster(), "!add ?").await.is_empty());
    assert_eq!(handler.count().await, 0);

    assert_eq!(t.say(&broadcaster(), "!add/enable").await, vec!["!add Enabled."]);
    assert!(t.say(&viewer(), "!add 1").await.is_empty());
    assert_eq!(handler.count().await, 1);
}

#[tokio::test]
async fn test_validation_failure_shows_short_help() {
    let handler = RecordingHandler::new();
    let mut registry = CommandRegistry::new();
    registry
        .command(["lookup", "find"])
        .action(handler.clone())
        .help(
            CmdFlags::EVERYONE,
            "usage: %alias%<song name>%|%Searches %beatsaver%.",
            ArgPattern::at_least_one(),
        )
        .register()
        .unwrap();
    let t = TestRouter::new(registry);

    assert_eq!(t.say(&viewer(), "!find").await, vec!["usage: !find <song name>"]);
    assert_eq!(handler.count().await, 0);

    assert!(t.say(&viewer(), "!find 4334-333").await.is_empty());
    assert_eq!(handler.calls().await[0].param, "4334-333");
}

#[tokio::test]
async fn test_question_mark_bypasses_validation() {
    let handler = RecordingHandler::new();
    let mut registry = CommandRegistry::new();
    registry
        .command(["queue"])
        .action(handler.clone())
        .help(
            CmdFlags::EVERYONE,
            "usage: %alias%%|%... Displays the queue.",
            ArgPattern::nothing(),
        )
        .register()
        .unwrap();
    let t = TestRouter::new(registry);

    assert_eq!(
        t.say(&viewer(), "!queue ?").await,
        vec!["usage: !queue ... Displays the queue."]
    );
    assert_eq!(handler.count().await, 0);
}

#[tokio::test]
async fn test_current_and_previous_rewrite_argument() {
    let handler = RecordingHandler::new();
    let t = single(
        CmdFlags::EVERYONE,
        ArgPattern::named("song_version").unwrap(),
        &handler,
    );

    assert_eq!(
        t.say(&viewer(), "!add/current").await,
        vec!["There is no /current song available."]
    );

    t.played("Older", Some("100-1"));
    t.played("Newer", Some("200"));

    assert!(t.say(&viewer(), "!add/current").await.is_empty());
    assert!(t.say(&viewer(), "!add /prev").await.is_empty());
    assert!(t.say(&broadcaster(), "!add/previous").await.is_empty());

    let params: Vec<String> = handler.calls().await.into_iter().map(|c| c.param).collect();
    assert_eq!(params, vec!["200", "100-1", "100-1"]);
}

#[tokio::test]
async fn test_history_song_without_version_fails_validation() {
    let handler = RecordingHandler::new();
    let t = single(CmdFlags::EVERYONE, ArgPattern::at_least_one(), &handler);
    t.played("Untracked", None);

    assert_eq!(t.say(&viewer(), "!add/current").await, vec!["usage: !add <song id>"]);
    assert_eq!(handler.count().await, 0);
}

#[tokio::test]
async fn test_non_broadcaster_switch_is_plain_text() {
    let handler = RecordingHandler::new();
    let t = single(CmdFlags::EVERYONE, ArgPattern::anything(), &handler);

    assert!(t.say(&moderator(), "!add/disable").await.is_empty());
    assert!(!t.router.registry().lookup("!add").unwrap().flags().contains(CmdFlags::DISABLED));
    assert_eq!(handler.calls().await[0].param, "/disable");
}

#[tokio::test]
async fn test_context_flags_and_info_reach_handler() {
    let handler = RecordingHandler::new();
    let t = single(CmdFlags::EVERYONE, ArgPattern::anything(), &handler);

    t.say_with(&viewer(), "!add x", CmdFlags::USER_FLAG1, "from-script").await;
    let call = &handler.calls().await[0];
    assert_eq!(call.flags, CmdFlags::USER_FLAG1);
    assert_eq!(call.info, "from-script");
}

#[tokio::test]
async fn test_handler_failure_and_panic_are_absorbed() {
    let failing = RecordingHandler::failing();
    let panicking = RecordingHandler::panicking();
    let fine = RecordingHandler::replying("ok %user%");

    let mut registry = CommandRegistry::new();
    registry
        .command(["fail"])
        .action(failing.clone())
        .flags(CmdFlags::EVERYONE)
        .register()
        .unwrap();
    registry
        .command(["boom"])
        .action(panicking.clone())
        .flags(CmdFlags::EVERYONE)
        .register()
        .unwrap();
    registry
        .command(["fine"])
        .action(fine.clone())
        .flags(CmdFlags::EVERYONE)
        .register()
        .unwrap();
    let t = TestRouter::new(registry);

    assert!(t.say(&viewer(), "!fail").await.is_empty());
    assert!(t.say(&viewer(), "!boom").await.is_empty());
    assert_eq!(t.say(&viewer(), "!fine").await, vec!["ok Lurker"]);

    assert_eq!(failing.count().await, 1);
    assert_eq!(panicking.count().await, 1);
}

#[tokio::test]
async fn test_spawned_handler_runs_off_dispatch() {
    let handler = RecordingHandler::replying("found it");
    let mut registry = CommandRegistry::new();
    registry
        .command(["lookup"])
        .task(handler.clone())
        .flags(CmdFlags::EVERYONE)
        .register()
        .unwrap();
    let t = TestRouter::new(registry);

    let (sink, out) = chatgate::ChatSink::capturing();
    t.router
        .dispatch(&viewer(), "!lookup song", CmdFlags::empty(), "", &sink)
        .await;

    tokio::time::timeout(Duration::from_secs(2), async {
        while out.lock().await.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("spawned handler never replied");

    assert_eq!(*out.lock().await, vec!["found it"]);
    assert_eq!(handler.calls().await[0].param, "song");
}

#[tokio::test]
async fn test_subcommand_entries_cannot_be_invoked() {
    let handler = RecordingHandler::new();
    let t = single(
        CmdFlags::EVERYONE | CmdFlags::SUBCOMMAND,
        ArgPattern::anything(),
        &handler,
    );

    assert!(t.say(&broadcaster(), "!add x").await.is_empty());
    assert_eq!(handler.count().await, 0);
}

#[tokio::test]
async fn test_first_registration_wins_at_dispatch() {
    let first = RecordingHandler::new();
    let second = RecordingHandler::new();
    let mut registry = CommandRegistry::new();
    registry
        .command(["queue"])
        .action(first.clone())
        .flags(CmdFlags::EVERYONE)
        .register()
        .unwrap();
    registry
        .command(["queue"])
        .action(second.clone())
        .flags(CmdFlags::EVERYONE)
        .register()
        .unwrap();
    let t = TestRouter::new(registry);

    t.say(&viewer(), "!queue").await;
    assert_eq!(first.count().await, 1);
    assert_eq!(second.count().await, 0);
}

#[tokio::test]
async fn test_usage_counter_tracks_invocations() {
    let handler = RecordingHandler::new();
    let t = single(CmdFlags::EVERYONE | CmdFlags::LOG, ArgPattern::at_least_one(), &handler);

    t.say(&viewer(), "!add 1").await;
    t.say(&viewer(), "!add 2").await;
    t.say(&viewer(), "!add").await; // rejected, not counted

    assert_eq!(t.router.registry().lookup("!add").unwrap().use_count(), 2);
    assert_eq!(t.router.registry().command_stats(), vec![("!add".to_string(), 2)]);
}
