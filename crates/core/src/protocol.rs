//! The wire envelope: JSON objects with a required `type` field, one message
//! per websocket text frame. Inbound and outbound messages share the shape;
//! `type` names the request or update kind.

use serde::{Deserialize, Serialize};

use crate::board::{Board, PuzzleId};
use crate::grid::{GRID_SIZE, Grid};
use crate::presence::{ClientId, RoomMember};

/// Everything a client can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    FetchIdentity {
        client_id: ClientId,
    },
    FetchPuzzles,
    FetchPuzzle {
        client_id: ClientId,
        puzzle_id: PuzzleId,
    },
    FetchChat {
        puzzle_id: PuzzleId,
    },
    SendChat {
        message: ChatPost,
    },
    SendPlayerPosition {
        client_id: ClientId,
        position: CursorPos,
    },
    SendCellChange {
        puzzle_id: PuzzleId,
        row: usize,
        col: usize,
        value: u8,
    },
    SendCandidateToggle {
        puzzle_id: PuzzleId,
        row: usize,
        col: usize,
        candidate: u8,
    },
    SendClearBoard {
        puzzle_id: PuzzleId,
    },
    SendCheckSolution {
        puzzle_id: PuzzleId,
    },
    SendIncorrectCellsUpdate {
        puzzle_id: PuzzleId,
        row: usize,
        col: usize,
    },
    SendElapsedTime {
        puzzle_id: PuzzleId,
        elapsed_time: u64,
    },
    SendLeaveRoom {
        client_id: ClientId,
        puzzle_id: PuzzleId,
    },
}

impl ClientMessage {
    /// Every wire name this enum accepts, for telling an unknown `type` apart
    /// from a malformed body.
    pub const KINDS: &'static [&'static str] = &[
        "fetchIdentity",
        "fetchPuzzles",
        "fetchPuzzle",
        "fetchChat",
        "sendChat",
        "sendPlayerPosition",
        "sendCellChange",
        "sendCandidateToggle",
        "sendClearBoard",
        "sendCheckSolution",
        "sendIncorrectCellsUpdate",
        "sendElapsedTime",
        "sendLeaveRoom",
    ];
}

/// Everything the server sends, broadcast or direct reply alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    UpdateIdentity {
        client: IdentityInfo,
    },
    Puzzles {
        puzzles: Vec<PuzzleSummary>,
    },
    UpdatePuzzle {
        board: Vec<Vec<WireCell>>,
        title: String,
    },
    UpdateIncorrectCells {
        incorrect_cells: Vec<CellRef>,
        puzzle_id: PuzzleId,
    },
    UpdatePlayers {
        players: Vec<PlayerInfo>,
    },
    UpdatePlayerPositions {
        positions: Vec<PlayerPosition>,
    },
    UpdateChat {
        messages: Vec<ChatEntry>,
    },
    UpdatePuzzleSolved,
    UpdateElapsedTime {
        elapsed_time: u64,
        puzzle_id: PuzzleId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityInfo {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleSummary {
    pub id: PuzzleId,
    pub title: String,
    pub difficulty: String,
    pub status: String,
}

/// One cell of the full-state board payload. An empty value is the empty
/// string, not null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCell {
    pub value: String,
    pub is_editable: bool,
    pub candidates: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub color: String,
}

/// A cursor on the wire, with `-1` sentinels for "no selection".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPos {
    pub row: i32,
    pub col: i32,
}

impl CursorPos {
    pub const NONE: CursorPos = CursorPos { row: -1, col: -1 };

    pub fn from_cursor(cursor: Option<(usize, usize)>) -> Self {
        match cursor {
            Some((row, col)) => CursorPos {
                row: row as i32,
                col: col as i32,
            },
            None => CursorPos::NONE,
        }
    }

    /// In-bounds coordinates, or `None` for sentinel/out-of-range values.
    pub fn to_cursor(self) -> Option<(usize, usize)> {
        let (row, col) = (usize::try_from(self.row).ok()?, usize::try_from(self.col).ok()?);
        Grid::in_bounds(row, col).then_some((row, col))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPosition {
    pub name: String,
    pub color: String,
    pub position: CursorPos,
}

/// One chat line. The store keeps the same shape; on the wire the text rides
/// in `message` and the timestamp in `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub user: String,
    pub color: String,
    #[serde(rename = "message")]
    pub text: String,
    #[serde(rename = "time")]
    pub timestamp: u64,
}

/// An inbound chat post; the server stamps the time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPost {
    pub user: String,
    pub color: String,
    pub text: String,
    pub puzzle_id: PuzzleId,
}

/// Full-state board payload built from the authoritative grid.
pub fn wire_board(grid: &Grid) -> Vec<Vec<WireCell>> {
    (0..GRID_SIZE)
        .map(|row| {
            (0..GRID_SIZE)
                .map(|col| {
                    let cell = grid.get(row, col);
                    WireCell {
                        value: cell.value().map(|v| v.to_string()).unwrap_or_default(),
                        is_editable: cell.is_editable(),
                        candidates: cell.candidates().iter().copied().collect(),
                    }
                })
                .collect()
        })
        .collect()
}

/// The `updatePuzzle` broadcast for a board.
pub fn board_update(board: &Board) -> ServerMessage {
    ServerMessage::UpdatePuzzle {
        board: wire_board(board.grid()),
        title: board.heading(),
    }
}

/// The `updateIncorrectCells` broadcast for a board.
pub fn incorrect_cells_update(board: &Board) -> ServerMessage {
    ServerMessage::UpdateIncorrectCells {
        incorrect_cells: board
            .incorrect()
            .iter()
            .map(|&(row, col)| CellRef { row, col })
            .collect(),
        puzzle_id: board.puzzle_id(),
    }
}

/// The `updatePlayers` broadcast for a room snapshot.
pub fn players_update(members: &[RoomMember]) -> ServerMessage {
    ServerMessage::UpdatePlayers {
        players: members
            .iter()
            .map(|m| PlayerInfo {
                name: m.name.clone(),
                color: m.color.clone(),
            })
            .collect(),
    }
}

/// The `updatePlayerPositions` broadcast for a room snapshot.
pub fn positions_update(members: &[RoomMember]) -> ServerMessage {
    ServerMessage::UpdatePlayerPositions {
        positions: members
            .iter()
            .map(|m| PlayerPosition {
                name: m.name.clone(),
                color: m.color.clone(),
                position: CursorPos::from_cursor(m.cursor),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_client_message_wire_names() {
        let text = r#"{"type":"sendCellChange","puzzleId":5,"row":2,"col":3,"value":7}"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        assert_eq!(
            msg,
            ClientMessage::SendCellChange {
                puzzle_id: 5,
                row: 2,
                col: 3,
                value: 7
            }
        );
    }

    #[test]
    fn test_fetch_identity_parses_uuid() {
        let id = Uuid::new_v4();
        let text = format!(r#"{{"type":"fetchIdentity","clientId":"{id}"}}"#);
        let msg: ClientMessage = serde_json::from_str(&text).unwrap();
        assert_eq!(msg, ClientMessage::FetchIdentity { client_id: id });
    }

    #[test]
    fn test_kinds_match_serde_names() {
        for kind in ClientMessage::KINDS {
            // Parsing with only the tag must never fail with "unknown
            // variant"; missing-field errors are fine.
            let err = serde_json::from_str::<ClientMessage>(&format!(r#"{{"type":"{kind}"}}"#))
                .err()
                .map(|e| e.to_string())
                .unwrap_or_default();
            assert!(
                !err.contains("unknown variant"),
                "kind {kind:?} not accepted: {err}"
            );
        }
    }

    #[test]
    fn test_server_message_tags() {
        let json = serde_json::to_value(&ServerMessage::UpdatePuzzleSolved).unwrap();
        assert_eq!(json["type"], "updatePuzzleSolved");

        let json = serde_json::to_value(&ServerMessage::UpdateElapsedTime {
            elapsed_time: 42,
            puzzle_id: 1,
        })
        .unwrap();
        assert_eq!(json["type"], "updateElapsedTime");
        assert_eq!(json["elapsedTime"], 42);
        assert_eq!(json["puzzleId"], 1);
    }

    #[test]
    fn test_wire_cell_shape() {
        let mut grid = Grid::empty();
        grid.get_mut(0, 0).set_value(4);
        grid.get_mut(0, 1).toggle_candidate(2);
        grid.get_mut(0, 1).toggle_candidate(1);

        let board = wire_board(&grid);
        assert_eq!(board.len(), 9);
        assert_eq!(board[0].len(), 9);
        assert_eq!(board[0][0].value, "4");
        assert_eq!(board[0][1].value, "");
        assert_eq!(board[0][1].candidates, vec![1, 2]);

        let json = serde_json::to_value(&board[0][0]).unwrap();
        assert!(json.get("isEditable").is_some());
    }

    #[test]
    fn test_chat_entry_wire_fields() {
        let entry = ChatEntry {
            user: "BraveTiger7".into(),
            color: "#a1b2c3".into(),
            text: "hello".into(),
            timestamp: 1000,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["message"], "hello");
        assert_eq!(json["time"], 1000);
    }

    #[test]
    fn test_cursor_sentinels() {
        assert_eq!(CursorPos::from_cursor(None), CursorPos::NONE);
        assert_eq!(CursorPos::NONE.to_cursor(), None);
        assert_eq!(CursorPos { row: 9, col: 0 }.to_cursor(), None);
        assert_eq!(
            CursorPos { row: 2, col: 3 }.to_cursor(),
            Some((2, 3))
        );
    }
}
