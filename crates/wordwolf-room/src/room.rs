//! Room actor: an isolated Tokio task that owns one [`Game`].
//!
//! Each room runs in its own task, communicating with the outside world
//! through a bounded mpsc channel. The mailbox is the room's lock: joins,
//! leaves, player commands, countdown ticks, and bot turns are all handled
//! one at a time by the same task, so no two of them ever see the game
//! half-updated.
//!
//! After anything that changes the game, the actor
//! 1. re-arms timers and bot tasks if the `(epoch, phase)` pair moved, and
//! 2. pushes a freshly projected snapshot into every connected player's
//!    [`Outbox`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use wordwolf_protocol::{
    ClientCommand, Difficulty, Phase, PlayerId, RoomCode, RoomListEntry, ServerMessage,
    TokenType,
};
use wordwolf_session::Outbox;

use crate::game::BotTurn;
use crate::projection::project;
use crate::timer::{self, Wiring};
use crate::{Game, RoomConfig, RoomError, RuleError, WordBank};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A player command that only makes sense inside a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomAction {
    ToggleReady,
    ToggleWantsMayor,
    StartGame,
    AddBot,
    SetDifficulty(Difficulty),
    ChooseWord(String),
    SubmitGuess(String),
    SubmitToken {
        token_type: TokenType,
        target: Option<PlayerId>,
    },
    RevealHint,
    Vote(PlayerId),
    ResetGame,
    SendReaction(String),
}

impl TryFrom<ClientCommand> for RoomAction {
    /// Commands handled outside any room are handed back unchanged.
    type Error = ClientCommand;

    fn try_from(cmd: ClientCommand) -> Result<Self, Self::Error> {
        let action = match cmd {
            ClientCommand::ToggleReady => Self::ToggleReady,
            ClientCommand::ToggleWantsMayor => Self::ToggleWantsMayor,
            ClientCommand::StartGame => Self::StartGame,
            ClientCommand::AddBot => Self::AddBot,
            ClientCommand::SetDifficulty(p) => Self::SetDifficulty(p.difficulty),
            ClientCommand::ChooseWord(p) => Self::ChooseWord(p.word),
            ClientCommand::SubmitGuess(p) => Self::SubmitGuess(p.text),
            ClientCommand::SubmitToken(p) => Self::SubmitToken {
                token_type: p.token_type,
                target: p.target_player_id,
            },
            ClientCommand::RevealHint => Self::RevealHint,
            ClientCommand::Vote(p) => Self::Vote(p.target_id),
            ClientCommand::ResetGame => Self::ResetGame,
            ClientCommand::SendReaction(p) => Self::SendReaction(p.emoji),
            other @ (ClientCommand::JoinGame(_) | ClientCommand::ListRooms) => {
                return Err(other);
            }
        };
        Ok(action)
    }
}

/// What became of a room after a player left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Other humans are still connected.
    Remaining(usize),
    /// The last human left; the room has stopped and should be forgotten.
    Empty,
    /// The player wasn't in this room.
    NotMember,
}

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in some variants is a reply channel: the caller
/// sends a command and waits for the answer on it.
pub(crate) enum RoomCommand {
    /// Seat a human and start delivering snapshots to `outbox`.
    Join {
        player_id: PlayerId,
        name: String,
        avatar_url: Option<String>,
        outbox: Outbox,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Remove a human (they disconnected).
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<LeaveOutcome>,
    },

    /// A player command.
    Action {
        player_id: PlayerId,
        action: RoomAction,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Request the listing entry.
    Info {
        reply: oneshot::Sender<RoomListEntry>,
    },

    /// One countdown step, from the timer spawned for `(epoch, phase)`.
    Tick { epoch: u64, phase: Phase },

    /// A bot's scheduled turn. The reply says whether it wants another.
    BotTurn {
        bot_id: PlayerId,
        epoch: u64,
        phase: Phase,
        reply: oneshot::Sender<bool>,
    },

    /// Stop the room.
    Shutdown,
}

// ---------------------------------------------------------------------------
// RoomHandle
// ---------------------------------------------------------------------------

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone: it's just an `mpsc::Sender` wrapper. The registry
/// holds one per room; connection handlers clone it out.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl std::fmt::Debug for RoomHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomHandle")
            .field("code", &self.code)
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl RoomHandle {
    /// The room's code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.code.clone())
    }

    /// Seats a human in the room.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: String,
        avatar_url: Option<String>,
        outbox: Outbox,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                name,
                avatar_url,
                outbox,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Removes a human from the room.
    pub async fn leave(&self, player_id: PlayerId) -> Result<LeaveOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Applies a player command and waits for the verdict.
    pub async fn act(&self, player_id: PlayerId, action: RoomAction) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Action {
                player_id,
                action,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Requests the room's listing entry.
    pub async fn info(&self) -> Result<RoomListEntry, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

// ---------------------------------------------------------------------------
// RoomActor
// ---------------------------------------------------------------------------

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    game: Game,
    /// Connected humans. Bots have no outbox.
    outboxes: HashMap<PlayerId, Outbox>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Our own mailbox, for handing to timer and bot tasks. Weak so the
    /// actor alone doesn't keep the channel open.
    mailbox: mpsc::WeakSender<RoomCommand>,
    shutdown: watch::Sender<bool>,
    countdown: Option<JoinHandle<()>>,
    /// The `(epoch, phase)` timers and bots were last armed for.
    scheduled: (u64, Phase),
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room = %self.game.code(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            let changed = match cmd {
                RoomCommand::Join {
                    player_id,
                    name,
                    avatar_url,
                    outbox,
                    reply,
                } => {
                    let result = self.handle_join(player_id, &name, avatar_url, outbox);
                    let joined = result.is_ok();
                    let _ = reply.send(result);
                    joined
                }
                RoomCommand::Leave { player_id, reply } => {
                    let outcome = self.handle_leave(&player_id);
                    let _ = reply.send(outcome);
                    match outcome {
                        LeaveOutcome::Empty => break,
                        LeaveOutcome::Remaining(_) => true,
                        LeaveOutcome::NotMember => false,
                    }
                }
                RoomCommand::Action {
                    player_id,
                    action,
                    reply,
                } => {
                    let result = self.handle_action(&player_id, action);
                    let changed = matches!(result, Ok(true));
                    let _ = reply.send(result.map(|_| ()));
                    changed
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(self.game.info());
                    false
                }
                RoomCommand::Tick { epoch, phase } => {
                    let applied = self.game.tick(epoch, phase);
                    if !applied {
                        tracing::debug!(
                            room = %self.game.code(),
                            epoch,
                            %phase,
                            "stale tick ignored"
                        );
                    }
                    applied
                }
                RoomCommand::BotTurn {
                    bot_id,
                    epoch,
                    phase,
                    reply,
                } => {
                    let turn = self.game.bot_turn(epoch, phase, &bot_id);
                    let _ = reply.send(turn == BotTurn::Again);
                    if turn == BotTurn::Stale {
                        tracing::debug!(
                            room = %self.game.code(),
                            bot = %bot_id,
                            epoch,
                            %phase,
                            "stale bot turn ignored"
                        );
                    }
                    turn != BotTurn::Stale
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room = %self.game.code(), "room shutting down");
                    break;
                }
            };

            if changed {
                self.reschedule();
                self.broadcast();
            }
        }

        self.stop();
        tracing::info!(room = %self.game.code(), "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: &str,
        avatar_url: Option<String>,
        outbox: Outbox,
    ) -> Result<(), RoomError> {
        self.game.add_human(player_id.clone(), name, avatar_url)?;
        self.outboxes.insert(player_id.clone(), outbox);
        tracing::info!(
            room = %self.game.code(),
            %player_id,
            players = self.game.len(),
            "player joined"
        );
        Ok(())
    }

    fn handle_leave(&mut self, player_id: &PlayerId) -> LeaveOutcome {
        let had_outbox = self.outboxes.remove(player_id).is_some();
        let revoters = self.game.remove_player(player_id);
        if !had_outbox && revoters.is_none() {
            return LeaveOutcome::NotMember;
        }
        // Bots whose vote went to the leaver vote again in this round;
        // reschedule only reacts to a new (epoch, phase).
        self.rearm_bots(revoters.unwrap_or_default());

        tracing::info!(
            room = %self.game.code(),
            %player_id,
            players = self.game.len(),
            "player left"
        );

        if self.outboxes.is_empty() {
            LeaveOutcome::Empty
        } else {
            LeaveOutcome::Remaining(self.outboxes.len())
        }
    }

    /// Applies one player command. `Ok(true)` means the game changed and
    /// everyone needs a new snapshot.
    fn handle_action(
        &mut self,
        player_id: &PlayerId,
        action: RoomAction,
    ) -> Result<bool, RoomError> {
        if !self.outboxes.contains_key(player_id) {
            tracing::warn!(
                room = %self.game.code(),
                %player_id,
                "command from non-member, ignoring"
            );
            return Err(RuleError::NotInRoom.into());
        }

        let game = &mut self.game;
        let result = match action {
            RoomAction::ToggleReady => game.toggle_ready(player_id),
            RoomAction::ToggleWantsMayor => game.toggle_wants_mayor(player_id),
            RoomAction::SetDifficulty(difficulty) => game.set_difficulty(player_id, difficulty),
            RoomAction::StartGame => game.start(player_id),
            RoomAction::AddBot => {
                return Ok(match game.add_bot() {
                    Some(bot) => {
                        tracing::info!(room = %game.code(), %bot, "bot added");
                        true
                    }
                    None => false,
                });
            }
            RoomAction::ChooseWord(word) => game.choose_word(player_id, &word),
            RoomAction::SubmitGuess(text) => game.submit_guess(player_id, &text),
            RoomAction::SubmitToken { token_type, target } => {
                game.submit_token(player_id, token_type, target.as_ref())
            }
            RoomAction::RevealHint => game.reveal_hint(player_id),
            RoomAction::Vote(target) => game.vote(player_id, &target),
            RoomAction::ResetGame => game.reset(player_id),
            RoomAction::SendReaction(emoji) => {
                let event = game.reaction(player_id, &emoji)?;
                for outbox in self.outboxes.values() {
                    outbox.deliver(ServerMessage::Reaction(event.clone()));
                }
                return Ok(false);
            }
        };

        if let Err(err) = result {
            tracing::debug!(
                room = %self.game.code(),
                %player_id,
                %err,
                "command rejected"
            );
        }
        result.map(|()| true).map_err(RoomError::from)
    }

    /// Re-arms the countdown and bot tasks when the game has moved to a
    /// new `(epoch, phase)`.
    fn reschedule(&mut self) {
        let (epoch, phase) = (self.game.epoch(), self.game.phase());
        if (epoch, phase) == self.scheduled {
            return;
        }
        self.scheduled = (epoch, phase);

        if let Some(countdown) = self.countdown.take() {
            countdown.abort();
        }
        tracing::info!(room = %self.game.code(), epoch, %phase, "phase entered");

        let Some(wiring) = self.wiring() else {
            return;
        };
        if self.game.is_timed() {
            self.countdown = Some(timer::spawn_countdown(
                wiring,
                self.game.config.tick_interval,
                epoch,
                phase,
            ));
        }

        self.rearm_bots(self.game.bots_to_schedule());
    }

    /// Spawns a turn task for each bot under the current `(epoch, phase)`.
    fn rearm_bots(&self, bots: Vec<PlayerId>) {
        if bots.is_empty() {
            return;
        }
        let (epoch, phase) = (self.game.epoch(), self.game.phase());
        let config = &self.game.config;
        let delay = match phase {
            Phase::WordSelection => config.bot_word_delay,
            Phase::DayPhase => config.bot_hint_delay,
            Phase::Voting | Phase::WerewolfGuess => config.bot_vote_delay,
            _ => return,
        };
        let Some(wiring) = self.wiring() else {
            return;
        };
        for bot in bots {
            tracing::debug!(room = %self.game.code(), %bot, %phase, epoch, "bot scheduled");
            timer::spawn_bot(wiring.clone(), delay, bot, epoch, phase);
        }
    }

    /// Handles timer and bot tasks use to reach this actor. `None` once
    /// the mailbox is gone.
    fn wiring(&self) -> Option<Wiring> {
        let mailbox = self.mailbox.upgrade()?;
        Some(Wiring {
            mailbox,
            shutdown: self.shutdown.subscribe(),
        })
    }

    /// Pushes each connected player their own view of the game.
    fn broadcast(&self) {
        for (player_id, outbox) in &self.outboxes {
            let snapshot = project(&self.game, player_id);
            outbox.deliver(ServerMessage::StateUpdate(Box::new(snapshot)));
        }
    }

    /// Silences every background task the room owns.
    fn stop(&mut self) {
        self.shutdown.send_replace(true);
        if let Some(countdown) = self.countdown.take() {
            countdown.abort();
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// The mailbox holds `config.mailbox_size` commands; senders wait when it
/// is full.
pub(crate) fn spawn_room(code: RoomCode, config: RoomConfig, words: Arc<WordBank>) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.mailbox_size.max(1));
    let (shutdown, _) = watch::channel(false);

    let actor = RoomActor {
        game: Game::new(code.clone(), config, words),
        outboxes: HashMap::new(),
        receiver: rx,
        mailbox: tx.downgrade(),
        shutdown,
        countdown: None,
        scheduled: (0, Phase::Lobby),
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
