//! Room registry: creates rooms, hands out codes, and finds rooms by code.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;

use wordwolf_protocol::{Phase, RoomCode, RoomListEntry};

use crate::room::spawn_room;
use crate::{RoomConfig, RoomError, RoomHandle, WordBank};

/// How many distinct `WOLF-NNNN` codes exist.
const CODE_SPACE: u32 = 10_000;

/// Random draws tried before falling back to listing every free code.
const CODE_DRAWS: usize = 32;

/// Maps room codes to running room actors.
///
/// The registry only ever holds handles. The server shares it behind a
/// `tokio::sync::Mutex` and never keeps the lock while awaiting a room:
/// callers clone the handle out and talk to the room afterwards.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
    config: RoomConfig,
    words: Arc<WordBank>,
}

impl RoomRegistry {
    /// Creates an empty registry. Every room it spawns shares `config` and
    /// draws words from `words`.
    pub fn new(config: RoomConfig, words: Arc<WordBank>) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
            words,
        }
    }

    /// The configuration new rooms get.
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Spawns a fresh room under an unused code.
    ///
    /// # Errors
    /// [`RoomError::CodesExhausted`] when every code is taken.
    pub fn create(&mut self) -> Result<RoomHandle, RoomError> {
        let code = self.free_code()?;
        let handle = spawn_room(code.clone(), self.config.clone(), Arc::clone(&self.words));
        self.rooms.insert(code.clone(), handle.clone());
        tracing::info!(room = %code, rooms = self.rooms.len(), "room created");
        Ok(handle)
    }

    /// A random code no live room holds.
    fn free_code(&self) -> Result<RoomCode, RoomError> {
        pick_code(&mut rand::rng(), |code| self.rooms.contains_key(code))
    }

    /// Looks up a live room.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if no room runs under `code`.
    pub fn get(&self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(code)
            .filter(|handle| !handle.is_closed())
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    /// Forgets a room. Returns its handle if it was registered.
    pub fn remove(&mut self, code: &RoomCode) -> Option<RoomHandle> {
        let handle = self.rooms.remove(code)?;
        tracing::info!(room = %code, rooms = self.rooms.len(), "room destroyed");
        Some(handle)
    }

    /// Clones every handle, for querying rooms without holding the lock.
    pub fn handles(&self) -> Vec<RoomHandle> {
        self.rooms.values().cloned().collect()
    }

    /// Number of registered rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no rooms are registered.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Draws a fresh random code until one is free. Once the space is
/// nearly full, picks uniformly among the codes still free.
fn pick_code<R, F>(rng: &mut R, taken: F) -> Result<RoomCode, RoomError>
where
    R: Rng,
    F: Fn(&RoomCode) -> bool,
{
    let code = |n: u32| RoomCode::new(format!("WOLF-{n:04}"));
    for _ in 0..CODE_DRAWS {
        let candidate = code(rng.random_range(0..CODE_SPACE));
        if !taken(&candidate) {
            return Ok(candidate);
        }
    }

    let free: Vec<RoomCode> = (0..CODE_SPACE)
        .map(code)
        .filter(|candidate| !taken(candidate))
        .collect();
    free.choose(rng).cloned().ok_or(RoomError::CodesExhausted)
}

/// Asks each room for its listing entry and keeps the joinable ones,
/// sorted by code. Rooms that stop mid-query are skipped.
pub async fn collect_listing(handles: Vec<RoomHandle>) -> Vec<RoomListEntry> {
    let mut rooms = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.info().await {
            Ok(entry) if entry.phase == Phase::Lobby => rooms.push(entry),
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(room = %handle.code(), %err, "room vanished during listing");
            }
        }
    }
    rooms.sort_by(|a, b| a.code.cmp(&b.code));
    rooms
}
