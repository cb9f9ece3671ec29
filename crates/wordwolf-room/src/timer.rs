//! Background tasks that drive a room forward without player input.
//!
//! Two kinds of task feed a room's mailbox:
//!
//! - a **countdown**, one per timed phase, sending a `Tick` every
//!   `tick_interval`;
//! - a **bot turn**, one per bot that acts in the current phase, sleeping
//!   a random think time and then sending a `BotTurn`.
//!
//! Neither task holds any room state. Each captures the epoch and phase it
//! was spawned for and the actor drops whatever no longer matches. Both
//! exit when the room's shutdown signal fires or its mailbox closes.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use wordwolf_protocol::{Phase, PlayerId};

use crate::DelayRange;
use crate::room::RoomCommand;

/// Where a background task sends its work and listens for shutdown.
#[derive(Clone)]
pub(crate) struct Wiring {
    pub(crate) mailbox: mpsc::Sender<RoomCommand>,
    pub(crate) shutdown: watch::Receiver<bool>,
}

/// Spawns the countdown for `phase`. The first tick fires one `period`
/// from now. Missed ticks are skipped rather than bunched up.
pub(crate) fn spawn_countdown(
    wiring: Wiring,
    period: Duration,
    epoch: u64,
    phase: Phase,
) -> JoinHandle<()> {
    let Wiring {
        mailbox,
        mut shutdown,
    } = wiring;

    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown.changed() => break,
            }
            if mailbox.send(RoomCommand::Tick { epoch, phase }).await.is_err() {
                break;
            }
        }
        tracing::trace!(epoch, %phase, "countdown stopped");
    })
}

/// Spawns one bot's turn loop for `phase`.
///
/// The bot thinks for a random delay, then asks the room to act for it.
/// If the room answers that the bot wants another go (a mayor bot handing
/// out hints), it thinks again; otherwise the task ends.
pub(crate) fn spawn_bot(
    wiring: Wiring,
    delay: DelayRange,
    bot_id: PlayerId,
    epoch: u64,
    phase: Phase,
) -> JoinHandle<()> {
    let Wiring {
        mailbox,
        mut shutdown,
    } = wiring;

    tokio::spawn(async move {
        loop {
            let wait = delay.sample(&mut rand::rng());
            tokio::select! {
                _ = time::sleep(wait) => {}
                _ = shutdown.changed() => break,
            }

            let (reply_tx, reply_rx) = oneshot::channel();
            let turn = RoomCommand::BotTurn {
                bot_id: bot_id.clone(),
                epoch,
                phase,
                reply: reply_tx,
            };
            if mailbox.send(turn).await.is_err() {
                break;
            }
            match reply_rx.await {
                Ok(true) => continue,
                _ => break,
            }
        }
        tracing::trace!(bot = %bot_id, epoch, %phase, "bot task finished");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wiring() -> (Wiring, mpsc::Receiver<RoomCommand>, watch::Sender<bool>) {
        let (tx, rx) = mpsc::channel(16);
        let (stop_tx, stop_rx) = watch::channel(false);
        (
            Wiring {
                mailbox: tx,
                shutdown: stop_rx,
            },
            rx,
            stop_tx,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_ticks_once_per_period() {
        let (w, mut rx, _stop) = wiring();
        let start = Instant::now();

        let task = spawn_countdown(w, Duration::from_secs(1), 3, Phase::DayPhase);

        for n in 1..=3 {
            match rx.recv().await {
                Some(RoomCommand::Tick { epoch, phase }) => {
                    assert_eq!((epoch, phase), (3, Phase::DayPhase));
                }
                _ => panic!("expected a tick"),
            }
            assert_eq!(start.elapsed(), Duration::from_secs(n));
        }
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_stops_on_shutdown() {
        let (w, _rx, stop) = wiring();

        let task = spawn_countdown(w, Duration::from_secs(1), 1, Phase::RoleReveal);
        stop.send(true).unwrap();

        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_bot_repeats_while_room_says_again() {
        let (w, mut rx, _stop) = wiring();

        let task = spawn_bot(
            w,
            DelayRange::secs(2, 3),
            PlayerId::new("bot"),
            1,
            Phase::DayPhase,
        );

        for answer in [true, true, false] {
            match rx.recv().await {
                Some(RoomCommand::BotTurn { bot_id, reply, .. }) => {
                    assert_eq!(bot_id.as_str(), "bot");
                    reply.send(answer).unwrap();
                }
                _ => panic!("expected a bot turn"),
            }
        }

        task.await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bot_sleeping_through_shutdown_never_acts() {
        let (w, mut rx, stop) = wiring();

        let task = spawn_bot(
            w,
            DelayRange::secs(5, 6),
            PlayerId::new("bot"),
            1,
            Phase::Voting,
        );
        stop.send(true).unwrap();
        task.await.unwrap();

        assert!(rx.try_recv().is_err());
    }
}
