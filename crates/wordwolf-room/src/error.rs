//! Error types for the room layer.
//!
//! The `Display` text of both enums is what the originating client sees
//! in its `ERROR` message.

use wordwolf_protocol::RoomCode;

/// Errors from finding, joining, or talking to a room.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room is registered under this code.
    #[error("Room not found")]
    NotFound(RoomCode),

    /// Every seat is taken.
    #[error("Room is full")]
    RoomFull(RoomCode),

    /// The room is past its lobby.
    #[error("Game already in progress")]
    GameInProgress(RoomCode),

    /// The participant already has a seat (here or elsewhere).
    #[error("Already in a room")]
    AlreadyInRoom,

    /// The display name is empty after trimming.
    #[error("Name is required")]
    InvalidName,

    /// The room actor has stopped, usually because its last human left.
    #[error("Room not found")]
    Unavailable(RoomCode),

    /// All `WOLF-NNNN` codes are taken.
    #[error("No room codes available")]
    CodesExhausted,

    /// The room understood the command but the game rules refused it.
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// A command that is illegal in the room's current state. Never changes
/// any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("You are not in this room")]
    NotInRoom,

    #[error("This can only be done in the lobby")]
    NotInLobby,

    #[error("Game already started")]
    AlreadyStarted,

    #[error("Need at least {min} players to start")]
    NotEnoughPlayers { min: usize },

    #[error("At most {max} players can play")]
    TooManyPlayers { max: usize },

    #[error("All players must be ready")]
    NotAllReady,

    #[error("Cannot choose word outside word selection phase")]
    NotWordSelection,

    #[error("Only the mayor can choose the word")]
    MayorOnlyWord,

    #[error("Invalid word choice")]
    InvalidWord,

    #[error("This can only be done during the day phase")]
    NotDayPhase,

    #[error("Only the mayor can do that")]
    MayorOnly,

    #[error("The mayor cannot guess")]
    MayorCannotGuess,

    #[error("Guess cannot be empty")]
    EmptyGuess,

    #[error("No more letters to reveal")]
    NoHintsLeft,

    #[error("Voting is not open")]
    VotingClosed,

    #[error("Only werewolves can vote in this phase")]
    WerewolvesOnly,

    #[error("Cannot vote for yourself")]
    SelfVote,

    #[error("Invalid vote target")]
    InvalidTarget,

    #[error("You have already voted")]
    AlreadyVoted,

    #[error("Invalid reaction")]
    InvalidReaction,
}
