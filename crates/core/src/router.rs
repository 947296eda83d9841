//! Message routing and room-scoped fan-out.
//!
//! One router instance serves every connection. Inbound frames are decoded,
//! dispatched by `type`, applied to the presence registry or a board, and
//! answered with full-state broadcasts rebuilt from authoritative state.
//! Boards are serialized per puzzle id behind their own mutex; edits to
//! different puzzles proceed independently. Nothing in here is fatal: bad
//! frames are logged and dropped, and a dead recipient never aborts the
//! fan-out loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};

use crate::board::{Board, PuzzleId};
use crate::grid::Grid;
use crate::presence::{ClientId, ConnId, ConnectionSink, Registry};
use crate::protocol::{self, ChatEntry, ChatPost, ClientMessage, CursorPos, ServerMessage};
use crate::store::PuzzleStore;

/// The sending connection, for replies that go to the sender only.
#[derive(Clone)]
pub struct ConnCtx {
    pub conn_id: ConnId,
    pub sink: Arc<dyn ConnectionSink>,
}

pub struct Router {
    registry: Registry,
    boards: RwLock<HashMap<PuzzleId, Arc<Mutex<Board>>>>,
    store: Arc<dyn PuzzleStore>,
}

impl Router {
    pub fn new(registry: Registry, store: Arc<dyn PuzzleStore>) -> Self {
        Self {
            registry,
            boards: RwLock::new(HashMap::new()),
            store,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Decodes one inbound text frame and dispatches it. Malformed frames and
    /// unknown types are logged and dropped; the connection stays open.
    pub fn handle_frame(&self, ctx: &ConnCtx, text: &str) {
        let message: ClientMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(err) => {
                self.log_rejected_frame(text, &err);
                return;
            }
        };
        self.handle(ctx, message);
    }

    fn log_rejected_frame(&self, text: &str, err: &serde_json::Error) {
        let kind = serde_json::from_str::<serde_json::Value>(text)
            .ok()
            .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string));
        match kind {
            Some(kind) if !ClientMessage::KINDS.contains(&kind.as_str()) => {
                info!("ignoring unknown message type {kind:?}");
            }
            Some(kind) => warn!("dropping malformed {kind:?} message: {err}"),
            None => warn!("dropping malformed message: {err}"),
        }
    }

    pub fn handle(&self, ctx: &ConnCtx, message: ClientMessage) {
        match message {
            ClientMessage::FetchIdentity { client_id } => self.fetch_identity(ctx, client_id),
            ClientMessage::FetchPuzzles => self.fetch_puzzles(ctx),
            ClientMessage::FetchPuzzle {
                client_id,
                puzzle_id,
            } => self.fetch_puzzle(ctx, client_id, puzzle_id),
            ClientMessage::FetchChat { puzzle_id } => self.fetch_chat(ctx, puzzle_id),
            ClientMessage::SendChat { message } => self.send_chat(message),
            ClientMessage::SendPlayerPosition {
                client_id,
                position,
            } => self.send_player_position(ctx, client_id, position),
            ClientMessage::SendCellChange {
                puzzle_id,
                row,
                col,
                value,
            } => self.send_cell_change(puzzle_id, row, col, value),
            ClientMessage::SendCandidateToggle {
                puzzle_id,
                row,
                col,
                candidate,
            } => self.send_candidate_toggle(puzzle_id, row, col, candidate),
            ClientMessage::SendClearBoard { puzzle_id } => self.send_clear_board(puzzle_id),
            ClientMessage::SendCheckSolution { puzzle_id } => self.send_check_solution(puzzle_id),
            ClientMessage::SendIncorrectCellsUpdate {
                puzzle_id,
                row,
                col,
            } => self.send_incorrect_cells_update(puzzle_id, row, col),
            ClientMessage::SendElapsedTime {
                puzzle_id,
                elapsed_time,
            } => self.send_elapsed_time(puzzle_id, elapsed_time),
            ClientMessage::SendLeaveRoom {
                client_id,
                puzzle_id,
            } => self.send_leave_room(client_id, puzzle_id),
        }
    }

    /// Called by the transport when a connection closes; equivalent to a
    /// leave-room from whichever player held it.
    pub fn handle_disconnect(&self, conn_id: ConnId) {
        if let Some(room) = self.registry.disconnect(conn_id) {
            self.broadcast_presence(room);
        }
    }

    fn fetch_identity(&self, ctx: &ConnCtx, client_id: ClientId) {
        let (name, color) =
            self.registry
                .ensure_identity(client_id, ctx.conn_id, Arc::clone(&ctx.sink));
        self.reply(
            ctx,
            &ServerMessage::UpdateIdentity {
                client: protocol::IdentityInfo { name, color },
            },
        );
    }

    fn fetch_puzzles(&self, ctx: &ConnCtx) {
        match self.store.list_puzzles() {
            Ok(puzzles) => self.reply(ctx, &ServerMessage::Puzzles { puzzles }),
            Err(err) => warn!("failed to list puzzles: {err}"),
        }
    }

    fn fetch_puzzle(&self, ctx: &ConnCtx, client_id: ClientId, puzzle_id: PuzzleId) {
        // A fetch may arrive before fetchIdentity; register silently so room
        // membership has a player to bind to.
        self.registry
            .ensure_identity(client_id, ctx.conn_id, Arc::clone(&ctx.sink));
        self.registry.set_room(client_id, puzzle_id);
        info!("player {client_id} joined puzzle {puzzle_id}");

        let Some(board) = self.board(puzzle_id) else {
            return;
        };
        let (board_update, incorrect_update) = {
            let board = board.lock().unwrap();
            (
                protocol::board_update(&board),
                protocol::incorrect_cells_update(&board),
            )
        };
        self.broadcast(puzzle_id, &board_update);
        self.broadcast(puzzle_id, &incorrect_update);
        self.broadcast_presence(puzzle_id);
    }

    fn fetch_chat(&self, ctx: &ConnCtx, puzzle_id: PuzzleId) {
        match self.store.load_chat(puzzle_id) {
            Ok(messages) => self.reply(ctx, &ServerMessage::UpdateChat { messages }),
            Err(err) => warn!("failed to fetch chat for puzzle {puzzle_id}: {err}"),
        }
    }

    fn send_chat(&self, post: ChatPost) {
        let puzzle_id = post.puzzle_id;
        let entry = ChatEntry {
            user: post.user,
            color: post.color,
            text: post.text,
            timestamp: now_millis(),
        };
        if let Err(err) = self.store.append_chat(puzzle_id, entry) {
            warn!("failed to save chat message for puzzle {puzzle_id}: {err}");
            return;
        }

        // Re-fetch so every recipient sees the store's view of the history.
        match self.store.load_chat(puzzle_id) {
            Ok(messages) => self.broadcast(puzzle_id, &ServerMessage::UpdateChat { messages }),
            Err(err) => warn!("failed to reload chat for puzzle {puzzle_id}: {err}"),
        }
    }

    fn send_player_position(&self, ctx: &ConnCtx, client_id: ClientId, position: CursorPos) {
        if !self.registry.contains(client_id) {
            // Position can race ahead of fetchIdentity on a fresh client.
            self.fetch_identity(ctx, client_id);
        }
        self.registry.set_cursor(client_id, position.to_cursor());

        if let Some(room) = self.registry.room_of(client_id) {
            let members = self.registry.players_in_room(room);
            self.broadcast(room, &protocol::positions_update(&members));
        }
    }

    fn send_cell_change(&self, puzzle_id: PuzzleId, row: usize, col: usize, value: u8) {
        if !Grid::in_bounds(row, col) || value > 9 {
            warn!("dropping cell change with bad arguments ({row},{col})={value}");
            return;
        }
        let Some(board) = self.board(puzzle_id) else {
            return;
        };

        let (board_update, solved) = {
            let mut board = board.lock().unwrap();
            board.set_cell(row, col, value);
            self.persist(&mut board);
            (protocol::board_update(&board), board.is_solved())
        };
        self.broadcast(puzzle_id, &board_update);
        if solved {
            info!("puzzle {puzzle_id} has been solved");
            self.broadcast(puzzle_id, &ServerMessage::UpdatePuzzleSolved);
        }
    }

    fn send_candidate_toggle(&self, puzzle_id: PuzzleId, row: usize, col: usize, candidate: u8) {
        if !Grid::in_bounds(row, col) {
            warn!("dropping candidate toggle with bad coordinates ({row},{col})");
            return;
        }
        let Some(board) = self.board(puzzle_id) else {
            return;
        };

        let board_update = {
            let mut board = board.lock().unwrap();
            if let Err(err) = board.toggle_candidate(row, col, candidate) {
                warn!("rejecting candidate toggle on puzzle {puzzle_id}: {err}");
                return;
            }
            self.persist(&mut board);
            protocol::board_update(&board)
        };
        self.broadcast(puzzle_id, &board_update);
    }

    fn send_clear_board(&self, puzzle_id: PuzzleId) {
        let Some(board) = self.board(puzzle_id) else {
            return;
        };

        let (incorrect_update, board_update) = {
            let mut board = board.lock().unwrap();
            board.clear_board();
            board.clear_incorrect();
            self.persist(&mut board);
            (
                protocol::incorrect_cells_update(&board),
                protocol::board_update(&board),
            )
        };
        self.broadcast(puzzle_id, &incorrect_update);
        self.broadcast(puzzle_id, &board_update);
    }

    fn send_check_solution(&self, puzzle_id: PuzzleId) {
        let Some(board) = self.board(puzzle_id) else {
            return;
        };

        let incorrect_update = {
            let mut board = board.lock().unwrap();
            board.recompute_incorrect();
            protocol::incorrect_cells_update(&board)
        };
        self.broadcast(puzzle_id, &incorrect_update);
    }

    fn send_incorrect_cells_update(&self, puzzle_id: PuzzleId, row: usize, col: usize) {
        let Some(board) = self.board(puzzle_id) else {
            return;
        };

        let incorrect_update = {
            let mut board = board.lock().unwrap();
            board.remove_incorrect(row, col);
            protocol::incorrect_cells_update(&board)
        };
        self.broadcast(puzzle_id, &incorrect_update);
    }

    fn send_elapsed_time(&self, puzzle_id: PuzzleId, elapsed_time: u64) {
        // Relayed verbatim; the server keeps no timer state.
        self.broadcast(
            puzzle_id,
            &ServerMessage::UpdateElapsedTime {
                elapsed_time,
                puzzle_id,
            },
        );
    }

    fn send_leave_room(&self, client_id: ClientId, puzzle_id: PuzzleId) {
        self.registry.clear_presence(client_id);
        info!("player {client_id} left puzzle {puzzle_id}");
        self.broadcast_presence(puzzle_id);
    }

    /// Returns the cached board, loading and decoding it from the store on
    /// first reference. The cache is never evicted.
    fn board(&self, puzzle_id: PuzzleId) -> Option<Arc<Mutex<Board>>> {
        if let Some(board) = self.boards.read().unwrap().get(&puzzle_id) {
            return Some(Arc::clone(board));
        }

        let record = match self.store.load_puzzle(puzzle_id) {
            Ok(record) => record,
            Err(err) => {
                warn!("failed to load puzzle {puzzle_id}: {err}");
                return None;
            }
        };
        let solution = match self.store.load_solution(puzzle_id) {
            Ok(solution) => solution,
            Err(err) => {
                warn!("failed to load solution for puzzle {puzzle_id}: {err}");
                return None;
            }
        };
        let board = match Board::decode(
            puzzle_id,
            &record.title,
            &record.difficulty,
            &record.sdx,
            &record.candidates,
            &solution,
        ) {
            Ok(board) => board,
            Err(err) => {
                warn!("puzzle {puzzle_id} has a corrupt encoding: {err}");
                return None;
            }
        };

        // A racing load of the same puzzle is settled here: first writer wins.
        let mut boards = self.boards.write().unwrap();
        Some(Arc::clone(
            boards
                .entry(puzzle_id)
                .or_insert_with(|| Arc::new(Mutex::new(board))),
        ))
    }

    /// Serializes and saves a mutated board. A failed save is logged; the
    /// in-memory state stays authoritative and is not rolled back.
    fn persist(&self, board: &mut Board) {
        if !board.take_dirty() {
            return;
        }
        let (sdx, candidates) = board.encoded();
        if let Err(err) = self.store.save_puzzle(board.puzzle_id(), &sdx, &candidates) {
            warn!("failed to persist puzzle {}: {err}", board.puzzle_id());
        }
    }

    fn broadcast_presence(&self, puzzle_id: PuzzleId) {
        let members = self.registry.players_in_room(puzzle_id);
        self.broadcast(puzzle_id, &protocol::positions_update(&members));
        self.broadcast(puzzle_id, &protocol::players_update(&members));
    }

    /// Sends one frame to every open connection in the room. A failed send is
    /// skipped without affecting the other recipients.
    fn broadcast(&self, puzzle_id: PuzzleId, message: &ServerMessage) {
        let frame = match serde_json::to_string(message) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("failed to encode broadcast: {err}");
                return;
            }
        };
        for (name, sink) in self.registry.sinks_in_room(puzzle_id) {
            if sink.send(frame.clone()).is_err() {
                debug!("skipping {name}: connection closed");
            }
        }
    }

    fn reply(&self, ctx: &ConnCtx, message: &ServerMessage) {
        let frame = match serde_json::to_string(message) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("failed to encode reply: {err}");
                return;
            }
        };
        if ctx.sink.send(frame).is_err() {
            debug!("dropping reply: connection closed");
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
