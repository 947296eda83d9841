pub mod board;
pub mod candidates;
pub mod cell;
pub mod codec;
pub mod grid;
pub mod names;
pub mod presence;
pub mod protocol;
pub mod router;
pub mod store;

pub use board::{Board, BoardError, PuzzleId};
pub use cell::Cell;
pub use codec::CodecError;
pub use grid::{BOX_SIZE, CELL_COUNT, GRID_SIZE, Grid};
pub use presence::{ClientId, ConnId, ConnectionSink, Registry, RoomMember, SinkClosed};
pub use protocol::{ChatEntry, ClientMessage, CursorPos, PuzzleSummary, ServerMessage};
pub use router::{ConnCtx, Router};
pub use store::{MemoryStore, PuzzleRecord, PuzzleStore, StoreError};
