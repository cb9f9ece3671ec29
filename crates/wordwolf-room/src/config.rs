//! Room configuration: player limits, phase durations, and bot pacing.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room the registry creates.
///
/// Phase durations are whole seconds because they are shown to players as
/// a countdown. `tick_interval` is how long one of those "seconds" really
/// takes, which tests shrink or drive with paused time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Minimum players required to start the game.
    pub min_players: usize,

    /// Maximum players (humans and bots) allowed in the room.
    pub max_players: usize,

    /// Countdown shown while players read their role.
    pub role_reveal_secs: u32,

    /// Countdown the mayor has to pick the secret word.
    pub word_selection_secs: u32,

    /// Countdown for the questioning phase.
    pub day_secs: u32,

    /// Countdown the werewolves have to find the Seer.
    pub werewolf_guess_secs: u32,

    /// Real time between two countdown ticks.
    pub tick_interval: Duration,

    /// Number of candidate words offered to the mayor.
    pub word_options: usize,

    /// Guesses are cut to this many characters.
    pub max_guess_len: usize,

    /// Display names are cut to this many characters.
    pub max_name_len: usize,

    /// Reactions longer than this many characters are rejected.
    pub max_reaction_len: usize,

    /// Delay before a mayor bot picks the secret word.
    pub bot_word_delay: DelayRange,

    /// Delay between two hints from a mayor bot.
    pub bot_hint_delay: DelayRange,

    /// Delay before a bot casts its vote.
    pub bot_vote_delay: DelayRange,

    /// Capacity of each room's command mailbox.
    pub mailbox_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 3,
            max_players: 10,
            role_reveal_secs: 8,
            word_selection_secs: 30,
            day_secs: 240,
            werewolf_guess_secs: 30,
            tick_interval: Duration::from_secs(1),
            word_options: 5,
            max_guess_len: 80,
            max_name_len: 24,
            max_reaction_len: 16,
            bot_word_delay: DelayRange::secs(2, 5),
            bot_hint_delay: DelayRange::secs(3, 6),
            bot_vote_delay: DelayRange::secs(2, 6),
            mailbox_size: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// DelayRange
// ---------------------------------------------------------------------------

/// A half-open `[min, max)` range bots draw their think time from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    /// A range in whole seconds.
    pub const fn secs(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_secs(min),
            max: Duration::from_secs(max),
        }
    }

    /// Draws a delay uniformly from the range. A degenerate range always
    /// yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        if hi <= lo {
            return self.min;
        }
        Duration::from_millis(rng.random_range(lo..hi))
    }
}
