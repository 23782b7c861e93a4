//! Commander Chess rules engine.
//!
//! # Board
//!
//! ```text
//! 11 files (a..k) x 12 ranks, square = rank * 16 + file
//!
//!   rank 0  -> displayed 12   a12 = 0x00
//!   rank 11 -> displayed 1    k1  = 0xba
//!
//! water     files a-b, plus c and d6 e6 d7 e7 (shared with land)
//! land      files c-k
//! bridges   f6 f7 h6 h7, the only crossings for heavy pieces
//! ```
//!
//! # Moves
//!
//! Pieces stack under blueprint rules and move as one piece. A stack may
//! also be split by a deploy: each unit relocates, strikes from the origin,
//! or stays, one step at a time, and the whole deploy is committed as a
//! single history entry once every unit is accounted for.
//!
//! ```
//! use commander_core::Game;
//!
//! let mut game = Game::new();
//! let start = game.fen();
//! game.make_move("c6").unwrap();
//! assert_eq!(game.history(), vec!["c6"]);
//! game.undo();
//! assert_eq!(game.fen(), start);
//! ```

pub mod air_defense;
pub mod apply;
pub mod board;
pub mod check;
pub mod deploy;
pub mod error;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod san;
pub mod square;
pub mod stacker;
pub mod terrain;
pub mod validate;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use board::Board;
pub use deploy::DeploySession;
pub use error::{FenError, GameError, GameResult, SanError, StackError};
pub use fen::STANDARD_FEN;
pub use game::{Game, GameState, HistoryEntry, MoveInput, MoveList, MoveQuery};
pub use moves::{DeployAction, Move};
pub use piece::{Color, Piece, Role};
pub use square::Square;
