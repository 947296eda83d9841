//! Player identity and room membership.
//!
//! Identity is keyed by a stable client id supplied by the client, not by the
//! connection: reconnecting with the same id rebinds the connection handle
//! without regenerating name or color. A "room" is never materialized; it is
//! the set of players whose current room equals a puzzle id, computed by
//! scanning the registry at broadcast time.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::board::PuzzleId;
use crate::names;

pub type ClientId = Uuid;
pub type ConnId = u64;

#[derive(Debug, thiserror::Error)]
#[error("connection closed")]
pub struct SinkClosed;

/// Write half of one client's connection. The server backs this with the
/// outbound channel of a websocket task; tests use recording sinks.
pub trait ConnectionSink: Send + Sync {
    /// Queues one outbound frame. An error means the connection is gone.
    fn send(&self, frame: String) -> Result<(), SinkClosed>;
    fn is_open(&self) -> bool;
}

/// One registered player. Name and color are immutable once generated; the
/// connection handle is the only rebindable part.
#[derive(Clone)]
pub struct Player {
    pub name: String,
    pub color: String,
    pub room: Option<PuzzleId>,
    pub cursor: Option<(usize, usize)>,
    conn: Option<(ConnId, Arc<dyn ConnectionSink>)>,
}

/// Snapshot of one player for broadcast payloads.
#[derive(Debug, Clone)]
pub struct RoomMember {
    pub name: String,
    pub color: String,
    pub cursor: Option<(usize, usize)>,
}

/// The process-wide player map. Players accumulate for the process lifetime;
/// there is no eviction.
#[derive(Default)]
pub struct Registry {
    players: RwLock<HashMap<ClientId, Player>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing player for `client_id`, rebinding its connection
    /// handle, or creates one with freshly generated name and color.
    pub fn ensure_identity(
        &self,
        client_id: ClientId,
        conn_id: ConnId,
        sink: Arc<dyn ConnectionSink>,
    ) -> (String, String) {
        let mut players = self.players.write().unwrap();
        let player = players.entry(client_id).or_insert_with(|| {
            let mut rng = rand::thread_rng();
            Player {
                name: names::generate_name(&mut rng),
                color: names::generate_color(&mut rng),
                room: None,
                cursor: None,
                conn: None,
            }
        });
        player.conn = Some((conn_id, sink));
        (player.name.clone(), player.color.clone())
    }

    pub fn contains(&self, client_id: ClientId) -> bool {
        self.players.read().unwrap().contains_key(&client_id)
    }

    pub fn set_room(&self, client_id: ClientId, puzzle_id: PuzzleId) {
        if let Some(player) = self.players.write().unwrap().get_mut(&client_id) {
            player.room = Some(puzzle_id);
        }
    }

    pub fn set_cursor(&self, client_id: ClientId, cursor: Option<(usize, usize)>) {
        if let Some(player) = self.players.write().unwrap().get_mut(&client_id) {
            player.cursor = cursor;
        }
    }

    pub fn room_of(&self, client_id: ClientId) -> Option<PuzzleId> {
        self.players
            .read()
            .unwrap()
            .get(&client_id)
            .and_then(|p| p.room)
    }

    /// Clears room and cursor; the identity itself stays. Returns the room
    /// the player was in.
    pub fn clear_presence(&self, client_id: ClientId) -> Option<PuzzleId> {
        let mut players = self.players.write().unwrap();
        let player = players.get_mut(&client_id)?;
        let room = player.room.take();
        player.cursor = None;
        room
    }

    /// Handles a closed connection: clears the presence of whichever player
    /// currently holds `conn_id` and returns the room it vacated. A player
    /// that already rebound to a newer connection is left alone.
    pub fn disconnect(&self, conn_id: ConnId) -> Option<PuzzleId> {
        let mut players = self.players.write().unwrap();
        let player = players
            .values_mut()
            .find(|p| matches!(p.conn, Some((id, _)) if id == conn_id))?;
        player.conn = None;
        let room = player.room.take();
        player.cursor = None;
        room
    }

    /// Linear scan for everyone currently viewing `puzzle_id`.
    pub fn players_in_room(&self, puzzle_id: PuzzleId) -> Vec<RoomMember> {
        self.players
            .read()
            .unwrap()
            .values()
            .filter(|p| p.room == Some(puzzle_id))
            .map(|p| RoomMember {
                name: p.name.clone(),
                color: p.color.clone(),
                cursor: p.cursor,
            })
            .collect()
    }

    /// Open connection handles for everyone in the room, for fan-out. Players
    /// mid-transition (e.g. just disconnected) are simply skipped.
    pub fn sinks_in_room(&self, puzzle_id: PuzzleId) -> Vec<(String, Arc<dyn ConnectionSink>)> {
        self.players
            .read()
            .unwrap()
            .values()
            .filter(|p| p.room == Some(puzzle_id))
            .filter_map(|p| {
                let (_, sink) = p.conn.as_ref()?;
                sink.is_open()
                    .then(|| (p.name.clone(), Arc::clone(sink)))
            })
            .collect()
    }
}
