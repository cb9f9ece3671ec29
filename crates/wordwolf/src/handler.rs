//! Per-connection handler: read loop, write loop, and command routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Create a session → the participant gets an ID and an outbox
//!   2. Spawn the writer → drains the outbox onto the socket, pings
//!   3. Loop: receive frames → decode → lobby command or room command
//!   4. On exit: leave the room, drop the room if it emptied, forget the
//!      session

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{self, Duration, Instant};

use wordwolf_protocol::{ClientCommand, Codec, JoinGamePayload, PlayerId, RoomCode, ServerMessage};
use wordwolf_room::{LeaveOutcome, RoomAction, RoomError, collect_listing};
use wordwolf_session::{Session, SessionConfig};
use wordwolf_transport::{Connection, Incoming, WebSocketConnection};

use crate::WordwolfError;
use crate::server::ServerState;

/// Drop guard that tears down a participant's session when the handler
/// exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async work.
struct SessionGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id.clone();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            disconnect(&state, &player_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), WordwolfError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();

    let (session, outbox_rx, config) = {
        let mut sessions = state.sessions.lock().await;
        let (session, rx) = sessions.create();
        (session, rx, sessions.config().clone())
    };
    let _guard = SessionGuard {
        player_id: session.player_id.clone(),
        state: Arc::clone(&state),
    };
    tracing::info!(
        %conn_id,
        peer = %conn.peer_addr(),
        player_id = %session.player_id,
        "participant connected"
    );

    let writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        Arc::clone(&state),
        outbox_rx,
        config.ping_interval,
    ));

    read_loop(&conn, &state, &session, &config).await;

    writer.abort();
    let _ = conn.close().await;
    // _guard drops here → room leave and session disconnect fire.
    Ok(())
}

/// Reads frames until the peer goes away or stays silent too long.
async fn read_loop<C: Codec>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<C>>,
    session: &Session,
    config: &SessionConfig,
) {
    let player_id = &session.player_id;

    loop {
        let incoming = match time::timeout(config.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(incoming))) => incoming,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%player_id, "connection timed out");
                break;
            }
        };

        let data = match incoming {
            Incoming::Data(data) => data,
            Incoming::Heartbeat => continue,
        };

        if data.len() > config.max_message_size {
            tracing::debug!(%player_id, len = data.len(), "oversized frame dropped");
            session
                .outbox
                .deliver(ServerMessage::error("Message too large"));
            continue;
        }

        let cmd = match state.codec.decode_command(&data) {
            Ok(cmd) => cmd,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode command");
                session
                    .outbox
                    .deliver(ServerMessage::error(e.client_message()));
                continue;
            }
        };

        let kind = cmd.kind();
        if let Err(e) = dispatch(state, session, cmd).await {
            tracing::debug!(%player_id, kind, error = %e, "command failed");
            session
                .outbox
                .deliver(ServerMessage::error(e.client_message()));
        }
    }
}

/// Drains the participant's outbox onto the socket and keeps the
/// connection alive with periodic pings.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut outbox_rx: mpsc::Receiver<ServerMessage>,
    ping_interval: Duration,
) {
    let mut ping = time::interval_at(Instant::now() + ping_interval, ping_interval);

    loop {
        tokio::select! {
            msg = outbox_rx.recv() => {
                let Some(msg) = msg else { break };
                let bytes = match state.codec.encode_message(&msg) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(conn_id = %conn.id(), error = %e, "failed to encode message");
                        continue;
                    }
                };
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(conn_id = %conn.id(), error = %e, "send failed");
                    break;
                }
            }
            _ = ping.tick() => {
                if conn.ping().await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Routes one decoded command.
async fn dispatch<C: Codec>(
    state: &Arc<ServerState<C>>,
    session: &Session,
    cmd: ClientCommand,
) -> Result<(), WordwolfError> {
    let action = match RoomAction::try_from(cmd) {
        Ok(action) => action,
        Err(ClientCommand::JoinGame(payload)) => return join_game(state, session, payload).await,
        Err(ClientCommand::ListRooms) => {
            let handles = state.registry.lock().await.handles();
            let rooms = collect_listing(handles).await;
            session.outbox.deliver(ServerMessage::RoomList { rooms });
            return Ok(());
        }
        Err(other) => {
            tracing::warn!(kind = other.kind(), "command has no route");
            return Ok(());
        }
    };

    let player_id = &session.player_id;
    let code = state
        .sessions
        .lock()
        .await
        .room_of(player_id)
        .cloned()
        .ok_or(WordwolfError::NotInRoom)?;
    let handle = state.registry.lock().await.get(&code)?;

    handle.act(player_id.clone(), action).await?;
    Ok(())
}

/// Seats the participant in an existing room, or in a new one when no
/// code is given.
async fn join_game<C: Codec>(
    state: &Arc<ServerState<C>>,
    session: &Session,
    payload: JoinGamePayload,
) -> Result<(), WordwolfError> {
    let player_id = &session.player_id;
    state.sessions.lock().await.ensure_idle(player_id)?;
    if payload.name.trim().is_empty() {
        return Err(RoomError::InvalidName.into());
    }

    let requested = payload
        .room_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(RoomCode::new);

    let (handle, created) = {
        let mut registry = state.registry.lock().await;
        match requested {
            Some(code) => (registry.get(&code)?, false),
            None => (registry.create()?, true),
        }
    };

    let joined = handle
        .join(
            player_id.clone(),
            payload.name,
            payload.avatar_url,
            session.outbox.clone(),
        )
        .await;
    if let Err(e) = joined {
        if created {
            let _ = handle.shutdown().await;
            state.registry.lock().await.remove(handle.code());
        }
        return Err(e.into());
    }

    state
        .sessions
        .lock()
        .await
        .attach(player_id, handle.code().clone())?;
    tracing::info!(%player_id, room = %handle.code(), created, "participant joined room");
    Ok(())
}

/// Removes the participant from their room (dropping the room if they
/// were its last human) and forgets their session.
async fn disconnect<C: Codec>(state: &Arc<ServerState<C>>, player_id: &PlayerId) {
    let session = state.sessions.lock().await.disconnect(player_id);
    let Some(code) = session.as_ref().and_then(Session::room).cloned() else {
        return;
    };

    let handle = match state.registry.lock().await.get(&code) {
        Ok(handle) => handle,
        Err(_) => return,
    };

    match handle.leave(player_id.clone()).await {
        Ok(LeaveOutcome::Empty) => {
            state.registry.lock().await.remove(&code);
        }
        Ok(LeaveOutcome::Remaining(humans)) => {
            tracing::debug!(%player_id, room = %code, humans, "left room");
        }
        Ok(LeaveOutcome::NotMember) => {}
        Err(e) => {
            tracing::debug!(%player_id, room = %code, error = %e, "leave failed");
        }
    }
}
