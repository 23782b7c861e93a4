//! Error types for the engine.
//!
//! Malformed input (FEN, SAN, square notation) and illegal moves are reported
//! synchronously; no error leaves the game state partially mutated.

use thiserror::Error;

use crate::piece::Role;

/// Errors that can occur while parsing FEN text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 6 space-separated fields, got {0}")]
    WrongFieldCount(usize),

    #[error("expected 12 rows separated by '/', got {0}")]
    WrongRowCount(usize),

    #[error("row {row} describes {files} files (must be 11)")]
    BadRowWidth { row: usize, files: usize },

    #[error("invalid piece character: '{0}'")]
    InvalidPiece(char),

    #[error("unterminated stack in row {0}")]
    UnterminatedStack(usize),

    #[error("invalid stack '{0}'")]
    InvalidStack(String),

    #[error("invalid turn field: '{0}'")]
    InvalidTurn(String),

    #[error("invalid square: '{0}'")]
    InvalidSquare(String),

    #[error("commander field '{0}' does not match the board")]
    CommanderMismatch(String),

    #[error("invalid number in field '{0}'")]
    InvalidNumber(String),

    #[error("{piece} cannot stand on {square}")]
    BadTerrain { piece: String, square: String },

    #[error("invalid deploy field: {0}")]
    InvalidDeploy(String),
}

/// Errors that can occur while parsing SAN.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanError {
    #[error("empty move text")]
    Empty,

    #[error("unparseable move text: '{0}'")]
    Unparseable(String),

    #[error("no legal move matches '{0}'")]
    NoMatch(String),

    #[error("move '{0}' is ambiguous")]
    Ambiguous(String),
}

/// Errors from combining or splitting stacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("pieces cannot form a stack")]
    Incompatible,

    #[error("stack does not contain a {0:?}")]
    MissingRole(Role),

    #[error("remaining pieces cannot be recombined after removing {0:?}")]
    Unrecombinable(Role),
}

/// Errors surfaced by the game controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error(transparent)]
    San(#[from] SanError),

    #[error(transparent)]
    Stack(#[from] StackError),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("no piece at {0}")]
    NoPieceAtSquare(String),

    #[error("a deploy session is in progress from {0}")]
    SessionActive(String),

    #[error("no deploy session is active")]
    NoSession,

    #[error("deploy session cannot be committed: {0}")]
    SessionIncomplete(String),

    #[error("cannot place {piece} on {square}")]
    InvalidPlacement { piece: String, square: String },
}

/// Result type alias for engine operations.
pub type GameResult<T> = Result<T, GameError>;
