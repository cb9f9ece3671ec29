//! Per-participant outbound queue.
//!
//! Every connected participant gets one [`Outbox`]. Rooms push
//! [`ServerMessage`]s into it from inside their actor task; a writer task
//! owned by the connection drains the other end onto the socket.
//!
//! Pushing never blocks. A participant whose socket can't keep up simply
//! misses messages once the queue is full. For snapshot traffic that's
//! harmless, since the next `STATE_UPDATE` supersedes the lost one.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use wordwolf_protocol::{PlayerId, ServerMessage};

/// The sending half of a participant's bounded message queue.
///
/// Cheap to clone; every clone feeds the same queue.
#[derive(Debug, Clone)]
pub struct Outbox {
    player_id: PlayerId,
    tx: mpsc::Sender<ServerMessage>,
}

impl Outbox {
    /// Creates an outbox holding at most `capacity` undelivered messages,
    /// returning it with the receiver the writer task should drain.
    pub fn channel(
        player_id: PlayerId,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { player_id, tx }, rx)
    }

    /// Who this outbox delivers to.
    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    /// Queues a message without waiting.
    ///
    /// Returns `false` if the message was dropped, either because the
    /// queue is full or because the writer task has gone away.
    pub fn deliver(&self, msg: ServerMessage) -> bool {
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!(
                    player_id = %self.player_id,
                    "outbox full, dropping message"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(
                    player_id = %self.player_id,
                    "outbox closed, dropping message"
                );
                false
            }
        }
    }

    /// Returns `true` once the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(n: u32) -> ServerMessage {
        ServerMessage::error(format!("m{n}"))
    }

    #[test]
    fn test_deliver_within_capacity_is_received_in_order() {
        let (outbox, mut rx) = Outbox::channel(PlayerId::new("p1"), 4);

        assert!(outbox.deliver(msg(1)));
        assert!(outbox.deliver(msg(2)));

        assert_eq!(rx.try_recv().unwrap(), msg(1));
        assert_eq!(rx.try_recv().unwrap(), msg(2));
    }

    #[test]
    fn test_deliver_when_full_drops_without_blocking() {
        let (outbox, mut rx) = Outbox::channel(PlayerId::new("p1"), 2);

        assert!(outbox.deliver(msg(1)));
        assert!(outbox.deliver(msg(2)));
        assert!(!outbox.deliver(msg(3)), "third message should be dropped");

        assert_eq!(rx.try_recv().unwrap(), msg(1));
        assert_eq!(rx.try_recv().unwrap(), msg(2));
        assert!(rx.try_recv().is_err());

        // Draining frees room again.
        assert!(outbox.deliver(msg(4)));
    }

    #[test]
    fn test_deliver_after_receiver_dropped_returns_false() {
        let (outbox, rx) = Outbox::channel(PlayerId::new("p1"), 2);
        drop(rx);

        assert!(outbox.is_closed());
        assert!(!outbox.deliver(msg(1)));
    }
}
