//! Participant session management for Wordwolf.
//!
//! This crate handles the lifecycle of participant connections:
//!
//! 1. **Identity**: every connection gets a fresh, server-generated
//!    `PlayerId` ([`SessionManager::create`])
//! 2. **Placement**: knowing which room each participant sits in
//! 3. **Delivery**: a bounded, never-blocking [`Outbox`] per participant
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← pushes per-viewer snapshots into outboxes
//!     ↕
//! Session Layer (this crate)  ← identity, placement, outbound queues
//!     ↕
//! Protocol Layer (below)  ← provides PlayerId, RoomCode, ServerMessage
//! ```

mod error;
mod manager;
mod outbox;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use outbox::Outbox;
pub use session::{Session, SessionConfig, SessionState};
