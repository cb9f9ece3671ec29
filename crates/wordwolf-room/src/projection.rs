//! Per-viewer snapshots.
//!
//! Every participant gets their own [`GameSnapshot`], computed fresh from
//! the canonical [`Game`] each time it's pushed. Nothing here mutates the
//! game, so a redacted role can never leak back into canonical state.

use wordwolf_protocol::{GameSnapshot, Phase, PlayerId, PlayerView, Role};

use crate::Game;
use crate::game::Player;

/// Builds the snapshot `viewer` is allowed to see.
///
/// - A player always sees their own role. Other roles are hidden unless
///   the phase is `LOBBY`/`GAME_OVER`, or both viewer and subject are
///   werewolves.
/// - The secret word is shown to the mayor, werewolves, and the Seer, and
///   to everyone once the day is over.
/// - Word options only reach the mayor, only during `WORD_SELECTION`.
pub fn project(game: &Game, viewer: &PlayerId) -> GameSnapshot {
    let me = game.player(viewer);
    let my_role = me.map(|p| p.role);
    let i_am_mayor = me.is_some_and(|p| p.is_mayor);
    let open_phase = matches!(game.phase, Phase::Lobby | Phase::GameOver);

    let players = game
        .players()
        .map(|p| view_of(game, p, viewer, my_role, open_phase))
        .collect();

    let sees_word = matches!(game.phase, Phase::GameOver | Phase::WerewolfGuess)
        || i_am_mayor
        || matches!(my_role, Some(Role::Werewolf | Role::Seer));
    let secret_word = if sees_word {
        game.secret_word.clone()
    } else {
        String::new()
    };

    let word_options = (game.phase == Phase::WordSelection && i_am_mayor)
        .then(|| game.word_options.clone());

    GameSnapshot {
        phase: game.phase,
        room_code: game.code.clone(),
        players,
        secret_word,
        secret_word_hints: game.secret_word_hints(),
        word_options,
        time_remaining: game.time_remaining,
        tokens_used: game.tokens_used,
        token_history: game.token_history.clone(),
        guesses: game.guesses.clone(),
        winner: game.winner,
        my_player_id: viewer.clone(),
        difficulty: game.difficulty,
        hints_revealed: game.hints_revealed,
        num_werewolves: game.num_werewolves(),
    }
}

fn view_of(
    game: &Game,
    p: &Player,
    viewer: &PlayerId,
    my_role: Option<Role>,
    open_phase: bool,
) -> PlayerView {
    let visible = open_phase
        || &p.id == viewer
        || (my_role == Some(Role::Werewolf) && p.role == Role::Werewolf);

    PlayerView {
        id: p.id.clone(),
        name: p.name.clone(),
        role: visible.then_some(p.role),
        is_mayor: p.is_mayor,
        is_ready: p.is_ready,
        wants_mayor: p.wants_mayor,
        avatar_url: Some(p.avatar_url.clone()),
        votes_received: game.votes_received(&p.id),
        is_bot: p.is_bot,
        score: game.score(&p.id),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use wordwolf_protocol::RoomCode;

    use super::*;
    use crate::{RoomConfig, WordBank};

    fn pid(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    /// Six ready humans, p1 as mayor volunteer, started and sitting in
    /// WORD_SELECTION.
    fn word_selection() -> Game {
        let mut g = Game::with_rng(
            RoomCode::new("WOLF-0100"),
            RoomConfig::default(),
            Arc::new(WordBank::uniform(&["Ocean", "Forest", "Desert", "Canyon", "Meadow"])),
            StdRng::seed_from_u64(42),
        );
        for i in 1..=6 {
            let id = pid(&format!("p{i}"));
            g.add_human(id.clone(), &format!("P{i}"), None).unwrap();
            g.toggle_ready(&id).unwrap();
        }
        g.toggle_wants_mayor(&pid("p1")).unwrap();
        g.start(&pid("p1")).unwrap();
        while g.phase() != Phase::WordSelection {
            g.tick(g.epoch(), g.phase());
        }
        g
    }

    fn first_with(g: &Game, pred: impl Fn(&Player) -> bool) -> PlayerId {
        g.players().find(|p| pred(p)).map(|p| p.id.clone()).unwrap()
    }

    #[test]
    fn test_villager_sees_only_own_role() {
        let g = word_selection();
        let villager = first_with(&g, |p| p.role == Role::Villager && !p.is_mayor);

        let snap = project(&g, &villager);

        for view in &snap.players {
            if view.id == villager {
                assert_eq!(view.role, Some(Role::Villager));
            } else {
                assert_eq!(view.role, None, "{} leaked", view.name);
            }
        }
        assert_eq!(snap.my_player_id, villager);
        assert!(snap.word_options.is_none());
    }

    #[test]
    fn test_werewolves_see_each_other_but_not_the_seer() {
        let g = word_selection();
        let wolf = first_with(&g, |p| p.role == Role::Werewolf);

        let snap = project(&g, &wolf);

        let visible: Vec<_> = snap.players.iter().filter_map(|v| v.role).collect();
        assert_eq!(visible, vec![Role::Werewolf, Role::Werewolf]);
    }

    #[test]
    fn test_only_mayor_gets_word_options() {
        let g = word_selection();

        let mayor_snap = project(&g, &pid("p1"));
        let other_snap = project(&g, &pid("p2"));

        assert_eq!(mayor_snap.word_options.as_ref().map(Vec::len), Some(5));
        assert!(other_snap.word_options.is_none());
    }

    #[test]
    fn test_secret_word_hidden_from_plain_villagers() {
        let mut g = word_selection();
        g.choose_word(&pid("p1"), "Ocean").unwrap();
        let villager = first_with(&g, |p| p.role == Role::Villager && !p.is_mayor);
        let seer = first_with(&g, |p| p.role == Role::Seer);
        let wolf = first_with(&g, |p| p.role == Role::Werewolf);

        assert_eq!(project(&g, &villager).secret_word, "");
        assert_eq!(project(&g, &seer).secret_word, "Ocean");
        assert_eq!(project(&g, &wolf).secret_word, "Ocean");
        assert_eq!(project(&g, &pid("p1")).secret_word, "Ocean");
    }

    #[test]
    fn test_werewolf_guess_reveals_word_to_all() {
        let mut g = word_selection();
        g.choose_word(&pid("p1"), "Ocean").unwrap();
        g.submit_token(&pid("p1"), wordwolf_protocol::TokenType::Correct, None)
            .unwrap();
        let villager = first_with(&g, |p| p.role == Role::Villager && !p.is_mayor);

        assert_eq!(project(&g, &villager).secret_word, "Ocean");
    }

    #[test]
    fn test_game_over_reveals_every_role() {
        let mut g = word_selection();
        g.choose_word(&pid("p1"), "Ocean").unwrap();
        g.submit_token(&pid("p1"), wordwolf_protocol::TokenType::Correct, None)
            .unwrap();
        while g.phase() != Phase::GameOver {
            g.tick(g.epoch(), g.phase());
        }
        let villager = first_with(&g, |p| p.role == Role::Villager && !p.is_mayor);

        let snap = project(&g, &villager);

        assert!(snap.players.iter().all(|v| v.role.is_some()));
        assert!(snap.winner.is_some());
    }

    #[test]
    fn test_repeated_projection_is_byte_identical_and_leaves_game_untouched() {
        let g = word_selection();
        let before: Vec<Role> = g.players().map(|p| p.role).collect();

        for viewer in g.players().map(|p| p.id.clone()) {
            let a = serde_json::to_vec(&project(&g, &viewer)).unwrap();
            let b = serde_json::to_vec(&project(&g, &viewer)).unwrap();
            assert_eq!(a, b, "projection for {viewer} is not stable");
        }
        assert_eq!(g.players().map(|p| p.role).collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_shared_fields_match_for_every_viewer() {
        let g = word_selection();
        let a = project(&g, &pid("p2"));
        let b = project(&g, &pid("p3"));

        assert_eq!(a.phase, b.phase);
        assert_eq!(a.time_remaining, b.time_remaining);
        assert_eq!(a.num_werewolves, 2);
        assert_eq!(a.num_werewolves, b.num_werewolves);
        let ids = |s: &GameSnapshot| s.players.iter().map(|v| v.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }
}
