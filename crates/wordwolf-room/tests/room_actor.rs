//! Integration tests for room actors: joins, snapshots, timers, bots, and
//! teardown. Time is paused so countdowns run instantly and in order.

use std::sync::Arc;

use tokio::sync::mpsc;
use wordwolf_protocol::{GameSnapshot, Phase, PlayerId, ServerMessage, TokenType, Winner};
use wordwolf_room::{
    DelayRange, LeaveOutcome, RoomAction, RoomConfig, RoomError, RoomHandle, RoomRegistry,
    RuleError, WordBank, collect_listing,
};
use wordwolf_session::Outbox;

const WORDS: [&str; 5] = ["Ocean", "Forest", "Desert", "Canyon", "Meadow"];

// =========================================================================
// Helpers
// =========================================================================

fn pid(s: &str) -> PlayerId {
    PlayerId::new(s)
}

fn config() -> RoomConfig {
    RoomConfig {
        day_secs: 5,
        bot_word_delay: DelayRange::secs(1, 2),
        bot_hint_delay: DelayRange::secs(1, 2),
        bot_vote_delay: DelayRange::secs(1, 2),
        ..RoomConfig::default()
    }
}

fn registry() -> RoomRegistry {
    RoomRegistry::new(config(), Arc::new(WordBank::uniform(&WORDS)))
}

async fn join(room: &RoomHandle, id: &str) -> mpsc::Receiver<ServerMessage> {
    let (outbox, rx) = Outbox::channel(pid(id), 512);
    room.join(pid(id), format!("Name {id}"), None, outbox)
        .await
        .unwrap();
    rx
}

async fn next_snapshot(rx: &mut mpsc::Receiver<ServerMessage>) -> GameSnapshot {
    loop {
        match rx.recv().await {
            Some(ServerMessage::StateUpdate(snapshot)) => return *snapshot,
            Some(_) => continue,
            None => panic!("outbox closed"),
        }
    }
}

async fn until_phase(rx: &mut mpsc::Receiver<ServerMessage>, phase: Phase) -> GameSnapshot {
    loop {
        let snapshot = next_snapshot(rx).await;
        if snapshot.phase == phase {
            return snapshot;
        }
    }
}

async fn ready_all(room: &RoomHandle, ids: &[&str]) {
    for id in ids {
        room.act(pid(id), RoomAction::ToggleReady).await.unwrap();
    }
}

// =========================================================================
// Joining and snapshots
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_join_delivers_own_snapshot() {
    let mut reg = registry();
    let room = reg.create().unwrap();

    let mut rx = join(&room, "p1").await;

    let snap = next_snapshot(&mut rx).await;
    assert_eq!(snap.phase, Phase::Lobby);
    assert_eq!(snap.my_player_id, pid("p1"));
    assert_eq!(snap.room_code, *room.code());
    assert_eq!(snap.players.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_every_member_gets_update_on_join() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let mut rx1 = join(&room, "p1").await;
    next_snapshot(&mut rx1).await;

    let _rx2 = join(&room, "p2").await;

    let snap = next_snapshot(&mut rx1).await;
    assert_eq!(snap.players.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_join_same_player_twice_rejected() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let _rx = join(&room, "p1").await;

    let (outbox, _rx2) = Outbox::channel(pid("p1"), 8);
    let result = room.join(pid("p1"), "Again".into(), None, outbox).await;

    assert!(matches!(result, Err(RoomError::AlreadyInRoom)));
}

#[tokio::test(start_paused = true)]
async fn test_command_from_non_member_is_rejected() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let _rx = join(&room, "p1").await;

    let result = room.act(pid("stranger"), RoomAction::ToggleReady).await;

    assert!(matches!(result, Err(RoomError::Rule(RuleError::NotInRoom))));
}

#[tokio::test(start_paused = true)]
async fn test_rule_error_is_returned_to_caller() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let _rx = join(&room, "p1").await;

    let result = room.act(pid("p1"), RoomAction::StartGame).await;

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "Need at least 3 players to start");
}

// =========================================================================
// Timers
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_countdown_walks_through_timed_phases() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let mut rx1 = join(&room, "p1").await;
    let _rx2 = join(&room, "p2").await;
    let _rx3 = join(&room, "p3").await;
    room.act(pid("p1"), RoomAction::ToggleWantsMayor)
        .await
        .unwrap();
    ready_all(&room, &["p1", "p2", "p3"]).await;

    room.act(pid("p2"), RoomAction::StartGame).await.unwrap();

    let reveal = until_phase(&mut rx1, Phase::RoleReveal).await;
    assert_eq!(reveal.time_remaining, 8);
    let mut expected = 7;
    loop {
        let snap = next_snapshot(&mut rx1).await;
        if snap.phase != Phase::RoleReveal {
            assert_eq!(snap.phase, Phase::WordSelection);
            assert_eq!(snap.time_remaining, 30);
            assert_eq!(snap.word_options.map(|w| w.len()), Some(5));
            break;
        }
        assert_eq!(snap.time_remaining, expected);
        expected -= 1;
    }

    // Nobody picks: the room picks for the mayor.
    let day = until_phase(&mut rx1, Phase::DayPhase).await;
    assert!(WORDS.contains(&day.secret_word.as_str()));
    assert_eq!(day.time_remaining, 5);

    let voting = until_phase(&mut rx1, Phase::Voting).await;
    assert_eq!(voting.time_remaining, 0);
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_reset_runs_single_countdown() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let mut rx1 = join(&room, "p1").await;
    let _rx2 = join(&room, "p2").await;
    let _rx3 = join(&room, "p3").await;
    ready_all(&room, &["p1", "p2", "p3"]).await;
    room.act(pid("p1"), RoomAction::StartGame).await.unwrap();
    until_phase(&mut rx1, Phase::RoleReveal).await;
    next_snapshot(&mut rx1).await;

    room.act(pid("p1"), RoomAction::ResetGame).await.unwrap();
    ready_all(&room, &["p1", "p2", "p3"]).await;
    room.act(pid("p1"), RoomAction::StartGame).await.unwrap();

    let restarted = until_phase(&mut rx1, Phase::RoleReveal).await;
    assert_eq!(restarted.time_remaining, 8);
    // One tick per second from one countdown; a leftover timer would
    // make the count skip.
    let start = tokio::time::Instant::now();
    for expected in (5..=7).rev() {
        let snap = next_snapshot(&mut rx1).await;
        assert_eq!(snap.time_remaining, expected);
    }
    assert_eq!(start.elapsed(), std::time::Duration::from_secs(3));
}

// =========================================================================
// Game flow through the actor
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_correct_token_leads_to_village_win_on_timeout() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let mut rx1 = join(&room, "p1").await;
    let _rx2 = join(&room, "p2").await;
    let _rx3 = join(&room, "p3").await;
    room.act(pid("p1"), RoomAction::ToggleWantsMayor)
        .await
        .unwrap();
    ready_all(&room, &["p1", "p2", "p3"]).await;
    room.act(pid("p1"), RoomAction::StartGame).await.unwrap();
    until_phase(&mut rx1, Phase::WordSelection).await;

    room.act(pid("p1"), RoomAction::ChooseWord("Forest".into()))
        .await
        .unwrap();
    room.act(
        pid("p1"),
        RoomAction::SubmitToken {
            token_type: TokenType::Correct,
            target: Some(pid("p2")),
        },
    )
    .await
    .unwrap();

    let guess = until_phase(&mut rx1, Phase::WerewolfGuess).await;
    assert_eq!(guess.secret_word, "Forest");
    let over = until_phase(&mut rx1, Phase::GameOver).await;
    assert_eq!(over.winner, Some(Winner::Village));
    assert!(over.players.iter().all(|p| p.role.is_some()));
}

#[tokio::test(start_paused = true)]
async fn test_bots_play_through_to_game_over() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let mut rx = join(&room, "p1").await;
    room.act(pid("p1"), RoomAction::AddBot).await.unwrap();
    room.act(pid("p1"), RoomAction::AddBot).await.unwrap();
    room.act(pid("p1"), RoomAction::ToggleWantsMayor)
        .await
        .unwrap();
    ready_all(&room, &["p1"]).await;
    room.act(pid("p1"), RoomAction::StartGame).await.unwrap();

    until_phase(&mut rx, Phase::WordSelection).await;
    room.act(pid("p1"), RoomAction::ChooseWord("Ocean".into()))
        .await
        .unwrap();
    let voting = until_phase(&mut rx, Phase::Voting).await;
    let bot = voting.players.iter().find(|p| p.is_bot).unwrap().id.clone();

    room.act(pid("p1"), RoomAction::Vote(bot)).await.unwrap();

    let over = until_phase(&mut rx, Phase::GameOver).await;
    assert!(over.winner.is_some());
    let total: usize = over.players.iter().map(|p| p.votes_received).sum();
    assert_eq!(total, 3);
}

#[tokio::test(start_paused = true)]
async fn test_mayor_bot_picks_word_and_hints() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let mut rx = join(&room, "p1").await;
    room.act(pid("p1"), RoomAction::AddBot).await.unwrap();
    room.act(pid("p1"), RoomAction::AddBot).await.unwrap();
    ready_all(&room, &["p1"]).await;

    // Mayor is random without volunteers; retry until a bot holds it.
    let mut rounds = 0;
    let day = loop {
        room.act(pid("p1"), RoomAction::StartGame).await.unwrap();
        let selection = until_phase(&mut rx, Phase::WordSelection).await;
        let mayor_is_bot = selection.players.iter().any(|p| p.is_mayor && p.is_bot);
        if mayor_is_bot {
            break until_phase(&mut rx, Phase::DayPhase).await;
        }
        rounds += 1;
        assert!(rounds < 50, "a bot never became mayor");
        room.act(pid("p1"), RoomAction::ResetGame).await.unwrap();
        ready_all(&room, &["p1"]).await;
    };
    assert!(WORDS.contains(&day.secret_word.as_str()) || day.secret_word.is_empty());

    let mut hinted = day;
    while hinted.tokens_used < 2 && hinted.phase == Phase::DayPhase {
        hinted = next_snapshot(&mut rx).await;
    }
    assert!(hinted.tokens_used >= 2);
    assert!(
        hinted
            .token_history
            .iter()
            .all(|t| t.token_type != TokenType::Correct)
    );
}

#[tokio::test(start_paused = true)]
async fn test_bot_votes_again_when_its_target_leaves() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let mut receivers = Vec::new();
    for id in ["p1", "p2", "p3"] {
        receivers.push((pid(id), join(&room, id).await));
    }
    room.act(pid("p1"), RoomAction::AddBot).await.unwrap();
    room.act(pid("p1"), RoomAction::ToggleWantsMayor)
        .await
        .unwrap();
    ready_all(&room, &["p1", "p2", "p3"]).await;
    room.act(pid("p1"), RoomAction::StartGame).await.unwrap();
    until_phase(&mut receivers[0].1, Phase::WordSelection).await;
    room.act(pid("p1"), RoomAction::ChooseWord("Ocean".into()))
        .await
        .unwrap();
    let voting = until_phase(&mut receivers[0].1, Phase::Voting).await;
    let bot = voting.players.iter().find(|p| p.is_bot).unwrap().id.clone();

    // Only the bot can have voted so far.
    let target = loop {
        let snap = next_snapshot(&mut receivers[0].1).await;
        if let Some(p) = snap.players.iter().find(|p| p.votes_received == 1) {
            break p.id.clone();
        }
    };

    let outcome = room.leave(target.clone()).await.unwrap();
    assert_eq!(outcome, LeaveOutcome::Remaining(2));
    receivers.retain(|(id, _)| *id != target);
    for (id, _) in &receivers {
        room.act(id.clone(), RoomAction::Vote(bot.clone()))
            .await
            .unwrap();
    }

    let rx = &mut receivers[0].1;
    let over = tokio::time::timeout(
        std::time::Duration::from_secs(60),
        until_phase(rx, Phase::GameOver),
    )
    .await
    .expect("voting should resolve once the bot votes again");
    let total: usize = over.players.iter().map(|p| p.votes_received).sum();
    assert_eq!(total, 3);
}

#[tokio::test(start_paused = true)]
async fn test_reaction_reaches_everyone_without_snapshot() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let mut rx1 = join(&room, "p1").await;
    let mut rx2 = join(&room, "p2").await;
    next_snapshot(&mut rx1).await;
    next_snapshot(&mut rx1).await;
    next_snapshot(&mut rx2).await;

    room.act(pid("p2"), RoomAction::SendReaction("🐺".into()))
        .await
        .unwrap();

    for rx in [&mut rx1, &mut rx2] {
        match rx.recv().await {
            Some(ServerMessage::Reaction(event)) => {
                assert_eq!(event.player_id, pid("p2"));
                assert_eq!(event.emoji, "🐺");
            }
            other => panic!("expected reaction, got {other:?}"),
        }
    }
}

// =========================================================================
// Leaving and teardown
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_leave_reports_remaining_then_empty() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let _rx1 = join(&room, "p1").await;
    let mut rx2 = join(&room, "p2").await;
    room.act(pid("p1"), RoomAction::AddBot).await.unwrap();

    assert_eq!(
        room.leave(pid("p1")).await.unwrap(),
        LeaveOutcome::Remaining(1)
    );
    assert_eq!(
        room.leave(pid("ghost")).await.unwrap(),
        LeaveOutcome::NotMember
    );
    until_snapshot_with(&mut rx2, 3).await;
    let snap = until_snapshot_with(&mut rx2, 2).await;
    assert!(snap.players.iter().all(|p| p.id != pid("p1")));

    // Bots don't keep a room alive.
    assert_eq!(room.leave(pid("p2")).await.unwrap(), LeaveOutcome::Empty);
    while !room.is_closed() {
        tokio::task::yield_now().await;
    }

    let (outbox, _rx) = Outbox::channel(pid("p3"), 8);
    let late = room.join(pid("p3"), "Late".into(), None, outbox).await;
    assert!(matches!(late, Err(RoomError::Unavailable(_))));
    assert!(reg.get(room.code()).is_err());
}

async fn until_snapshot_with(
    rx: &mut mpsc::Receiver<ServerMessage>,
    players: usize,
) -> GameSnapshot {
    loop {
        let snap = next_snapshot(rx).await;
        if snap.players.len() == players {
            return snap;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_join_after_start_is_refused() {
    let mut reg = registry();
    let room = reg.create().unwrap();
    let _rx1 = join(&room, "p1").await;
    let _rx2 = join(&room, "p2").await;
    let _rx3 = join(&room, "p3").await;
    ready_all(&room, &["p1", "p2", "p3"]).await;
    room.act(pid("p1"), RoomAction::StartGame).await.unwrap();

    let (outbox, _rx) = Outbox::channel(pid("late"), 8);
    let result = room.join(pid("late"), "Late".into(), None, outbox).await;

    assert!(matches!(result, Err(RoomError::GameInProgress(_))));
}

#[tokio::test(start_paused = true)]
async fn test_listing_hides_started_rooms() {
    let mut reg = registry();
    let open = reg.create().unwrap();
    let busy = reg.create().unwrap();
    let _rx0 = join(&open, "o1").await;
    let _rx1 = join(&busy, "p1").await;
    let _rx2 = join(&busy, "p2").await;
    let _rx3 = join(&busy, "p3").await;
    ready_all(&busy, &["p1", "p2", "p3"]).await;
    busy.act(pid("p1"), RoomAction::StartGame).await.unwrap();

    let listing = collect_listing(reg.handles()).await;

    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].code, *open.code());
    assert_eq!(listing[0].player_names, vec!["Name o1"]);
}
