//! The game state machine for one room.
//!
//! [`Game`] is plain data plus rules: no tasks, no channels, no clocks
//! other than wall time for timestamps. The room actor owns one `Game`,
//! feeds it commands, ticks, and bot turns, and broadcasts a projection
//! after each change.
//!
//! # Phases
//!
//! ```text
//! LOBBY → ROLE_REVEAL → WORD_SELECTION → DAY_PHASE ─┬→ VOTING ─────────┬→ GAME_OVER
//!                                                    └→ WEREWOLF_GUESS ─┘
//! ```
//!
//! `RESET_GAME` returns to `LOBBY` from anywhere.
//!
//! # Epochs
//!
//! Every `start` bumps the epoch. Ticks and bot turns carry the epoch and
//! phase they were scheduled for; anything that no longer matches is
//! ignored, so a timer left over from an earlier game can't touch the
//! current one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};

use wordwolf_protocol::{
    Difficulty, GuessEntry, Phase, PlayerId, ReactionEvent, Role, RoomCode,
    RoomListEntry, TokenAction, TokenType, Winner,
};

use crate::{RoomConfig, RoomError, RuleError, WordBank};

/// Names handed to bots, first unused one wins.
pub const BOT_NAMES: [&str; 12] = [
    "Luna", "Felix", "Shadow", "Maple", "Coco", "Mochi", "Pepper", "Honey",
    "Biscuit", "Pumpkin", "Stormy", "Hazel",
];

const AVATAR_BASE: &str = "https://api.dicebear.com/7.x/adventurer/svg";
const AVATAR_BACKGROUNDS: &str = "b6e3f4,c0aede,d1d4f9,ffd5dc,ffdfbf";

/// Generated avatar used when a player doesn't bring their own.
pub fn default_avatar(seed: &str) -> String {
    format!("{AVATAR_BASE}?seed={seed}&backgroundColor={AVATAR_BACKGROUNDS}")
}

/// 1 werewolf below six players, 2 from six up.
pub fn werewolf_count(players: usize) -> usize {
    if players >= 6 { 2 } else { 1 }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// The canonical record of one seat. Only [`Game`] mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub is_mayor: bool,
    pub is_ready: bool,
    pub wants_mayor: bool,
    pub avatar_url: String,
    pub is_bot: bool,
}

/// Outcome of a bot's scheduled turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotTurn {
    /// The game moved on (or the bot is gone); nothing happened.
    Stale,
    /// The bot acted and has nothing more to do this phase.
    Done,
    /// The bot acted and wants another turn after a fresh delay.
    Again,
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// Canonical state of one room.
pub struct Game {
    pub(crate) code: RoomCode,
    pub(crate) config: RoomConfig,
    words: Arc<WordBank>,
    rng: StdRng,

    /// Roster in join order; display order and scan order.
    pub(crate) order: Vec<PlayerId>,
    pub(crate) players: HashMap<PlayerId, Player>,

    pub(crate) phase: Phase,
    pub(crate) epoch: u64,
    pub(crate) secret_word: String,
    pub(crate) word_options: Vec<String>,
    pub(crate) time_remaining: u32,
    pub(crate) tokens_used: u32,
    /// Newest hint first, except that a matching guess appends CORRECT.
    pub(crate) token_history: Vec<TokenAction>,
    /// Pending guesses in submission order, at most one per player.
    pub(crate) guesses: Vec<GuessEntry>,
    /// voter → target
    pub(crate) votes: HashMap<PlayerId, PlayerId>,
    pub(crate) winner: Option<Winner>,
    pub(crate) scores: HashMap<PlayerId, u32>,
    pub(crate) difficulty: Difficulty,
    pub(crate) hints_revealed: usize,
    num_werewolves: usize,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("code", &self.code)
            .field("phase", &self.phase)
            .field("epoch", &self.epoch)
            .field("players", &self.order.len())
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Creates an empty lobby seeded from the OS.
    pub fn new(code: RoomCode, config: RoomConfig, words: Arc<WordBank>) -> Self {
        Self::with_rng(code, config, words, StdRng::from_os_rng())
    }

    /// Creates an empty lobby with a caller-supplied RNG.
    pub fn with_rng(
        code: RoomCode,
        config: RoomConfig,
        words: Arc<WordBank>,
        rng: StdRng,
    ) -> Self {
        Self {
            code,
            config,
            words,
            rng,
            order: Vec::new(),
            players: HashMap::new(),
            phase: Phase::Lobby,
            epoch: 0,
            secret_word: String::new(),
            word_options: Vec::new(),
            time_remaining: 0,
            tokens_used: 0,
            token_history: Vec::new(),
            guesses: Vec::new(),
            votes: HashMap::new(),
            winner: None,
            scores: HashMap::new(),
            difficulty: Difficulty::default(),
            hints_revealed: 0,
            num_werewolves: 0,
        }
    }

    // -- Read access ------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn secret_word(&self) -> &str {
        &self.secret_word
    }

    pub fn word_options(&self) -> &[String] {
        &self.word_options
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn tokens_used(&self) -> u32 {
        self.tokens_used
    }

    pub fn token_history(&self) -> &[TokenAction] {
        &self.token_history
    }

    pub fn guesses(&self) -> &[GuessEntry] {
        &self.guesses
    }

    pub fn votes(&self) -> &HashMap<PlayerId, PlayerId> {
        &self.votes
    }

    pub fn hints_revealed(&self) -> usize {
        self.hints_revealed
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Players in roster order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.order.iter().filter_map(|id| self.players.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of seats held by humans.
    pub fn human_count(&self) -> usize {
        self.players().filter(|p| !p.is_bot).count()
    }

    pub fn mayor(&self) -> Option<&Player> {
        self.players().find(|p| p.is_mayor)
    }

    /// Votes currently pointing at `id`. Derived, never stored.
    pub fn votes_received(&self, id: &PlayerId) -> usize {
        self.votes.values().filter(|t| *t == id).count()
    }

    /// Accumulated score; survives resets.
    pub fn score(&self, id: &PlayerId) -> u32 {
        self.scores.get(id).copied().unwrap_or(0)
    }

    /// Werewolves in play. In the lobby, how many the current roster
    /// would get.
    pub fn num_werewolves(&self) -> usize {
        match self.phase {
            Phase::Lobby => werewolf_count(self.order.len()),
            _ => self.num_werewolves,
        }
    }

    /// Returns `true` while a countdown drives the current phase.
    pub fn is_timed(&self) -> bool {
        matches!(
            self.phase,
            Phase::RoleReveal
                | Phase::WordSelection
                | Phase::DayPhase
                | Phase::WerewolfGuess
        )
    }

    /// The secret word with unrevealed letters masked, e.g. `O c _ _ _`.
    /// `None` until the mayor has revealed at least one letter.
    pub fn secret_word_hints(&self) -> Option<String> {
        if self.hints_revealed == 0 || self.secret_word.is_empty() {
            return None;
        }
        let mut letters = 0;
        let cells: Vec<String> = self
            .secret_word
            .chars()
            .map(|c| {
                if !c.is_alphabetic() {
                    return c.to_string();
                }
                letters += 1;
                if letters <= self.hints_revealed {
                    c.to_string()
                } else {
                    "_".to_string()
                }
            })
            .collect();
        Some(cells.join(" "))
    }

    /// Bots that act in the current phase.
    pub fn bots_to_schedule(&self) -> Vec<PlayerId> {
        self.players()
            .filter(|p| p.is_bot)
            .filter(|p| match self.phase {
                Phase::WordSelection | Phase::DayPhase => p.is_mayor,
                Phase::Voting => true,
                Phase::WerewolfGuess => p.role == Role::Werewolf,
                _ => false,
            })
            .map(|p| p.id.clone())
            .collect()
    }

    /// Summary for room listings.
    pub fn info(&self) -> RoomListEntry {
        RoomListEntry {
            code: self.code.clone(),
            player_count: self.order.len(),
            max_players: self.config.max_players,
            phase: self.phase,
            player_names: self.players().map(|p| p.name.clone()).collect(),
        }
    }

    fn member(&self, id: &PlayerId) -> Result<&Player, RuleError> {
        self.players.get(id).ok_or(RuleError::NotInRoom)
    }

    fn random_hex_id(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.random();
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    // -- Roster -----------------------------------------------------------

    /// Seats a human. Only possible in the lobby with a free seat.
    ///
    /// # Errors
    /// `GameInProgress`, `RoomFull`, `AlreadyInRoom`, or `InvalidName`.
    pub fn add_human(
        &mut self,
        id: PlayerId,
        name: &str,
        avatar_url: Option<String>,
    ) -> Result<(), RoomError> {
        if self.phase != Phase::Lobby {
            return Err(RoomError::GameInProgress(self.code.clone()));
        }
        if self.order.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.code.clone()));
        }
        if self.players.contains_key(&id) {
            return Err(RoomError::AlreadyInRoom);
        }
        let name: String = name.trim().chars().take(self.config.max_name_len).collect();
        let name = name.trim_end().to_string();
        if name.is_empty() {
            return Err(RoomError::InvalidName);
        }
        let avatar_url = avatar_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| default_avatar(id.as_str()));

        self.order.push(id.clone());
        self.players.insert(
            id.clone(),
            Player {
                id,
                name,
                role: Role::Villager,
                is_mayor: false,
                is_ready: false,
                wants_mayor: false,
                avatar_url,
                is_bot: false,
            },
        );
        Ok(())
    }

    /// Seats a bot. A silent no-op outside the lobby or when full.
    pub fn add_bot(&mut self) -> Option<PlayerId> {
        if self.phase != Phase::Lobby || self.order.len() >= self.config.max_players {
            return None;
        }

        let id = PlayerId::new(self.random_hex_id());
        let name = match BOT_NAMES
            .iter()
            .find(|n| !self.players.values().any(|p| p.name == **n))
        {
            Some(name) => (*name).to_string(),
            None => format!("Bot-{}", self.rng.random_range(0..999)),
        };

        self.order.push(id.clone());
        self.players.insert(
            id.clone(),
            Player {
                id: id.clone(),
                name,
                role: Role::Villager,
                is_mayor: false,
                is_ready: true,
                wants_mayor: false,
                avatar_url: default_avatar(&format!("bot-{id}")),
                is_bot: true,
            },
        );
        Some(id)
    }

    /// Deletes a seat along with every vote and guess tied to it, then
    /// re-checks whether voting can resolve.
    ///
    /// Returns `None` if the player wasn't seated. Otherwise returns the
    /// bots whose vote went to the departed player, in seat order. They
    /// are pending again and need a fresh turn in the round still open.
    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Vec<PlayerId>> {
        self.players.remove(id)?;
        self.order.retain(|p| p != id);
        self.votes.remove(id);

        let mut retracted = Vec::new();
        self.votes.retain(|voter, target| {
            if target == id {
                retracted.push(voter.clone());
                false
            } else {
                true
            }
        });
        self.guesses.retain(|g| &g.player_id != id);
        self.check_votes_complete();

        if !self.phase.is_voting() {
            return Some(Vec::new());
        }
        let revoters = self
            .players()
            .filter(|p| p.is_bot && retracted.contains(&p.id))
            .map(|p| p.id.clone())
            .collect();
        Some(revoters)
    }

    // -- Lobby --------------------------------------------------------------

    pub fn toggle_ready(&mut self, id: &PlayerId) -> Result<(), RuleError> {
        self.lobby_player_mut(id)?.is_ready ^= true;
        Ok(())
    }

    pub fn toggle_wants_mayor(&mut self, id: &PlayerId) -> Result<(), RuleError> {
        self.lobby_player_mut(id)?.wants_mayor ^= true;
        Ok(())
    }

    pub fn set_difficulty(
        &mut self,
        id: &PlayerId,
        difficulty: Difficulty,
    ) -> Result<(), RuleError> {
        self.lobby_player_mut(id)?;
        self.difficulty = difficulty;
        Ok(())
    }

    fn lobby_player_mut(&mut self, id: &PlayerId) -> Result<&mut Player, RuleError> {
        if self.phase != Phase::Lobby {
            return Err(RuleError::NotInLobby);
        }
        self.players.get_mut(id).ok_or(RuleError::NotInRoom)
    }

    /// Deals roles, picks a mayor, draws candidate words, and enters
    /// `ROLE_REVEAL` under a new epoch.
    ///
    /// # Errors
    /// `AlreadyStarted`, `NotEnoughPlayers`, `TooManyPlayers`, or
    /// `NotAllReady`.
    pub fn start(&mut self, id: &PlayerId) -> Result<(), RuleError> {
        self.member(id)?;
        if self.phase != Phase::Lobby {
            return Err(RuleError::AlreadyStarted);
        }
        let n = self.order.len();
        if n < self.config.min_players {
            return Err(RuleError::NotEnoughPlayers {
                min: self.config.min_players,
            });
        }
        if n > self.config.max_players {
            return Err(RuleError::TooManyPlayers {
                max: self.config.max_players,
            });
        }
        if self.players().any(|p| !p.is_ready) {
            return Err(RuleError::NotAllReady);
        }

        self.epoch += 1;

        let wolves = werewolf_count(n);
        let mut roles: Vec<Role> = (0..n)
            .map(|i| match i {
                i if i < wolves => Role::Werewolf,
                i if i == wolves => Role::Seer,
                _ => Role::Villager,
            })
            .collect();
        roles.shuffle(&mut self.rng);

        let volunteers: Vec<usize> = self
            .players()
            .enumerate()
            .filter(|(_, p)| p.wants_mayor)
            .map(|(i, _)| i)
            .collect();
        let mayor_idx = match volunteers.choose(&mut self.rng) {
            Some(&i) => i,
            None => self.rng.random_range(0..n),
        };

        for (i, pid) in self.order.iter().enumerate() {
            if let Some(p) = self.players.get_mut(pid) {
                p.role = roles[i];
                p.is_mayor = i == mayor_idx;
                p.wants_mayor = false;
            }
        }

        self.num_werewolves = wolves;
        self.secret_word.clear();
        self.word_options =
            self.words
                .pick(self.difficulty, self.config.word_options, &mut self.rng);
        self.tokens_used = 0;
        self.token_history.clear();
        self.guesses.clear();
        self.votes.clear();
        self.winner = None;
        self.hints_revealed = 0;
        self.phase = Phase::RoleReveal;
        self.time_remaining = self.config.role_reveal_secs;

        tracing::info!(
            room = %self.code,
            epoch = self.epoch,
            players = n,
            "game started"
        );
        Ok(())
    }

    // -- Word selection -----------------------------------------------------

    /// The mayor commits to one of the offered words.
    ///
    /// # Errors
    /// `NotWordSelection`, `MayorOnlyWord`, or `InvalidWord`.
    pub fn choose_word(&mut self, id: &PlayerId, word: &str) -> Result<(), RuleError> {
        if self.phase != Phase::WordSelection {
            return Err(RuleError::NotWordSelection);
        }
        if !self.member(id)?.is_mayor {
            return Err(RuleError::MayorOnlyWord);
        }
        if !self.word_options.iter().any(|w| w == word) {
            return Err(RuleError::InvalidWord);
        }
        self.secret_word = word.to_string();
        self.enter_day();
        Ok(())
    }

    fn auto_pick_word(&mut self) {
        if let Some(word) = self.word_options.choose(&mut self.rng) {
            self.secret_word = word.clone();
        }
    }

    // -- Day phase ----------------------------------------------------------

    /// Records a non-mayor's guess, replacing their previous one. A guess
    /// matching the secret word ends the day.
    ///
    /// # Errors
    /// `NotDayPhase`, `MayorCannotGuess`, or `EmptyGuess`.
    pub fn submit_guess(&mut self, id: &PlayerId, text: &str) -> Result<(), RuleError> {
        if self.phase != Phase::DayPhase {
            return Err(RuleError::NotDayPhase);
        }
        if self.member(id)?.is_mayor {
            return Err(RuleError::MayorCannotGuess);
        }
        let text: String = text.trim().chars().take(self.config.max_guess_len).collect();
        let text = text.trim_end().to_string();
        if text.is_empty() {
            return Err(RuleError::EmptyGuess);
        }

        if text.to_lowercase() == self.secret_word.trim().to_lowercase() {
            tracing::info!(room = %self.code, player_id = %id, "secret word guessed");
            let token = TokenAction {
                id: self.random_hex_id(),
                token_type: TokenType::Correct,
                timestamp: now_millis(),
                target_player_id: Some(id.clone()),
            };
            self.token_history.push(token);
            self.tokens_used += 1;
            self.guesses.clear();
            self.enter_werewolf_guess();
            return Ok(());
        }

        self.guesses.retain(|g| &g.player_id != id);
        self.guesses.push(GuessEntry {
            player_id: id.clone(),
            text,
            timestamp: now_millis(),
        });
        Ok(())
    }

    /// The mayor answers with a token. `CORRECT` ends the day; anything
    /// else clears pending guesses.
    ///
    /// The token is aimed at `target` if that is a non-mayor in the room,
    /// else at the most recent guesser, else at a random non-mayor.
    ///
    /// # Errors
    /// `NotDayPhase` or `MayorOnly`.
    pub fn submit_token(
        &mut self,
        id: &PlayerId,
        token_type: TokenType,
        target: Option<&PlayerId>,
    ) -> Result<(), RuleError> {
        if self.phase != Phase::DayPhase {
            return Err(RuleError::NotDayPhase);
        }
        if !self.member(id)?.is_mayor {
            return Err(RuleError::MayorOnly);
        }

        let target = target
            .filter(|t| self.players.get(*t).is_some_and(|p| !p.is_mayor))
            .cloned()
            .or_else(|| self.guesses.last().map(|g| g.player_id.clone()))
            .or_else(|| self.random_non_mayor());
        self.record_token(token_type, target);
        Ok(())
    }

    fn random_non_mayor(&mut self) -> Option<PlayerId> {
        let candidates: Vec<&PlayerId> = self
            .order
            .iter()
            .filter(|id| self.players.get(*id).is_some_and(|p| !p.is_mayor))
            .collect();
        candidates.choose(&mut self.rng).map(|id| (*id).clone())
    }

    fn record_token(&mut self, token_type: TokenType, target: Option<PlayerId>) {
        let token = TokenAction {
            id: self.random_hex_id(),
            token_type,
            timestamp: now_millis(),
            target_player_id: target,
        };
        self.token_history.insert(0, token);
        self.tokens_used += 1;
        self.guesses.clear();

        if token_type == TokenType::Correct {
            self.enter_werewolf_guess();
        }
    }

    /// Reveals the next letter of the secret word to everyone. At least one
    /// letter always stays hidden.
    ///
    /// # Errors
    /// `NotDayPhase`, `MayorOnly`, or `NoHintsLeft`.
    pub fn reveal_hint(&mut self, id: &PlayerId) -> Result<(), RuleError> {
        if self.phase != Phase::DayPhase {
            return Err(RuleError::NotDayPhase);
        }
        if !self.member(id)?.is_mayor {
            return Err(RuleError::MayorOnly);
        }
        let letters = self.secret_word.chars().filter(|c| c.is_alphabetic()).count();
        if self.hints_revealed + 1 >= letters {
            return Err(RuleError::NoHintsLeft);
        }
        self.hints_revealed += 1;
        Ok(())
    }

    // -- Voting -------------------------------------------------------------

    /// Casts `voter`'s single vote for this phase.
    ///
    /// # Errors
    /// `VotingClosed`, `WerewolvesOnly`, `SelfVote`, `InvalidTarget`, or
    /// `AlreadyVoted`.
    pub fn vote(&mut self, voter: &PlayerId, target: &PlayerId) -> Result<(), RuleError> {
        if !self.phase.is_voting() {
            return Err(RuleError::VotingClosed);
        }
        let role = self.member(voter)?.role;
        if self.phase == Phase::WerewolfGuess && role != Role::Werewolf {
            return Err(RuleError::WerewolvesOnly);
        }
        if voter == target {
            return Err(RuleError::SelfVote);
        }
        if !self.players.contains_key(target) {
            return Err(RuleError::InvalidTarget);
        }
        if self.votes.contains_key(voter) {
            return Err(RuleError::AlreadyVoted);
        }

        self.votes.insert(voter.clone(), target.clone());
        self.check_votes_complete();
        Ok(())
    }

    /// The player with strictly the most votes. A tie at the top, or no
    /// votes at all, yields `None`.
    pub fn top_target(&self) -> Option<PlayerId> {
        let mut best: Option<(&PlayerId, usize)> = None;
        let mut tied = false;
        for id in &self.order {
            let n = self.votes_received(id);
            if n == 0 {
                continue;
            }
            match best {
                Some((_, top)) if n < top => {}
                Some((_, top)) if n == top => tied = true,
                _ => {
                    best = Some((id, n));
                    tied = false;
                }
            }
        }
        if tied {
            None
        } else {
            best.map(|(id, _)| id.clone())
        }
    }

    fn check_votes_complete(&mut self) {
        let eligible = |p: &Player| match self.phase {
            Phase::Voting => true,
            Phase::WerewolfGuess => p.role == Role::Werewolf,
            _ => false,
        };
        if !self.phase.is_voting() {
            return;
        }
        let pending = self
            .players()
            .any(|p| eligible(p) && !self.votes.contains_key(&p.id));
        if pending {
            return;
        }

        let top_role = self
            .top_target()
            .and_then(|id| self.players.get(&id).map(|p| p.role));
        match self.phase {
            Phase::Voting => {
                // Nobody left to vote and nobody voted: keep waiting.
                if self.votes.is_empty() {
                    return;
                }
                let winner = match top_role {
                    Some(Role::Werewolf) => Winner::Village,
                    _ => Winner::Werewolf,
                };
                self.end_game(winner);
            }
            Phase::WerewolfGuess => {
                let winner = match top_role {
                    Some(Role::Seer) => Winner::Werewolf,
                    _ => Winner::Village,
                };
                self.end_game(winner);
            }
            _ => {}
        }
    }

    // -- Transitions ------------------------------------------------------

    fn enter_word_selection(&mut self) {
        self.phase = Phase::WordSelection;
        self.time_remaining = self.config.word_selection_secs;
    }

    fn enter_day(&mut self) {
        self.word_options.clear();
        self.guesses.clear();
        self.phase = Phase::DayPhase;
        self.time_remaining = self.config.day_secs;
        tracing::info!(room = %self.code, epoch = self.epoch, "day phase started");
    }

    fn enter_voting(&mut self) {
        self.votes.clear();
        self.guesses.clear();
        self.phase = Phase::Voting;
        self.time_remaining = 0;
    }

    fn enter_werewolf_guess(&mut self) {
        self.votes.clear();
        self.phase = Phase::WerewolfGuess;
        self.time_remaining = self.config.werewolf_guess_secs;
    }

    fn end_game(&mut self, winner: Winner) {
        self.phase = Phase::GameOver;
        self.winner = Some(winner);
        self.time_remaining = 0;

        for id in &self.order {
            let Some(p) = self.players.get(id) else {
                continue;
            };
            let gain = match winner {
                Winner::Village if p.role != Role::Werewolf => {
                    if p.is_mayor { 2 } else { 1 }
                }
                Winner::Werewolf if p.role == Role::Werewolf => 2,
                _ => 0,
            };
            *self.scores.entry(id.clone()).or_insert(0) += gain;
        }

        tracing::info!(room = %self.code, epoch = self.epoch, ?winner, "game over");
    }

    /// Back to the lobby. Roster and scores stay; bots stay ready.
    pub fn reset(&mut self, id: &PlayerId) -> Result<(), RuleError> {
        self.member(id)?;
        self.phase = Phase::Lobby;
        self.secret_word.clear();
        self.word_options.clear();
        self.time_remaining = 0;
        self.tokens_used = 0;
        self.token_history.clear();
        self.guesses.clear();
        self.votes.clear();
        self.winner = None;
        self.hints_revealed = 0;
        self.num_werewolves = 0;
        for p in self.players.values_mut() {
            p.is_ready = p.is_bot;
            p.role = Role::Villager;
            p.is_mayor = false;
            p.wants_mayor = false;
        }
        tracing::info!(room = %self.code, "reset to lobby");
        Ok(())
    }

    // -- Time and bots --------------------------------------------------------

    /// One countdown step. Ignored unless `epoch` and `phase` still match.
    /// The tick that reaches zero ends the phase. Returns `true` if the
    /// tick was applied.
    pub fn tick(&mut self, epoch: u64, phase: Phase) -> bool {
        if epoch != self.epoch || phase != self.phase || !self.is_timed() {
            return false;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            match self.phase {
                Phase::RoleReveal => self.enter_word_selection(),
                Phase::WordSelection => {
                    self.auto_pick_word();
                    self.enter_day();
                }
                Phase::DayPhase => self.enter_voting(),
                Phase::WerewolfGuess => self.end_game(Winner::Village),
                _ => {}
            }
        }
        true
    }

    /// Lets `bot` act, if the game is still where it was when the turn was
    /// scheduled.
    pub fn bot_turn(&mut self, epoch: u64, phase: Phase, bot: &PlayerId) -> BotTurn {
        if epoch != self.epoch || phase != self.phase {
            return BotTurn::Stale;
        }
        let Some((is_mayor, role)) = self
            .players
            .get(bot)
            .filter(|p| p.is_bot)
            .map(|p| (p.is_mayor, p.role))
        else {
            return BotTurn::Stale;
        };

        match phase {
            Phase::WordSelection if is_mayor => {
                self.auto_pick_word();
                self.enter_day();
                BotTurn::Done
            }
            Phase::DayPhase if is_mayor => {
                let token_type = *TokenType::HINTS
                    .choose(&mut self.rng)
                    .unwrap_or(&TokenType::Maybe);
                let target = self.random_non_mayor();
                self.record_token(token_type, target);
                BotTurn::Again
            }
            Phase::Voting => self.bot_vote(bot),
            Phase::WerewolfGuess if role == Role::Werewolf => self.bot_vote(bot),
            _ => BotTurn::Stale,
        }
    }

    fn bot_vote(&mut self, bot: &PlayerId) -> BotTurn {
        if self.votes.contains_key(bot) {
            return BotTurn::Done;
        }
        let target = {
            let targets: Vec<&PlayerId> = self.order.iter().filter(|id| *id != bot).collect();
            targets.choose(&mut self.rng).map(|id| (*id).clone())
        };
        let Some(target) = target else {
            return BotTurn::Done;
        };
        tracing::debug!(room = %self.code, bot = %bot, target = %target, "bot voted");
        self.votes.insert(bot.clone(), target);
        self.check_votes_complete();
        BotTurn::Done
    }

    // -- Reactions ----------------------------------------------------------

    /// Validates a reaction for fan-out. Reactions are never stored.
    ///
    /// # Errors
    /// `NotInRoom` or `InvalidReaction`.
    pub fn reaction(&self, id: &PlayerId, emoji: &str) -> Result<ReactionEvent, RuleError> {
        self.member(id)?;
        let emoji = emoji.trim();
        if emoji.is_empty() || emoji.chars().count() > self.config.max_reaction_len {
            return Err(RuleError::InvalidReaction);
        }
        Ok(ReactionEvent {
            player_id: id.clone(),
            emoji: emoji.to_string(),
        })
    }
}

// =========================================================================
// Tests
// =========================================================================
