//! Error types shared by the engine, its configuration and the text board parser.

use thiserror::Error;

use crate::engine::{Position, Tile};

/// Why a configuration was refused by [`crate::game::BoardEngine::initialize`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid must be at least {min}x{min}, got {rows}x{cols}")]
    GridTooSmall { rows: usize, cols: usize, min: usize },

    #[error("tile kind count must be between {min} and {max}, got {got}")]
    TileKinds { got: usize, min: usize, max: usize },

    #[error("cascade pass limit must be at least 1")]
    ZeroCascadeLimit,

    #[error("no match-free board can be built from {kinds} tile kind(s)")]
    GenerationExhausted { kinds: usize },

    #[error("board is {found_rows}x{found_cols} but the configuration expects {rows}x{cols}")]
    BoardShape {
        rows: usize,
        cols: usize,
        found_rows: usize,
        found_cols: usize,
    },

    #[error("tile {tile:?} at {pos} is not one of the configured kinds")]
    ForeignTile { tile: Tile, pos: Position },

    #[error("board already contains a match")]
    UnsettledBoard,
}

/// Why a swap intent was refused before touching the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidSwap {
    #[error("position {0} is outside the board")]
    OutOfBounds(Position),

    #[error("positions {0} and {1} are not adjacent")]
    NotAdjacent(Position, Position),
}

/// Failures of an initialized (or not yet initialized) engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("engine has not been initialized")]
    Uninitialized,

    /// The board kept producing matches past the configured pass limit.
    /// The game instance is discarded and must be re-initialized.
    #[error("cascade did not settle within {0} passes")]
    CascadeLimitExceeded(u32),

    /// A previous [`crate::game::Cascade`] was leaked before it settled.
    #[error("a cascade is still resolving")]
    Resolving,
}

/// Errors from [`crate::utils::board_from_str_array`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardParseError {
    #[error("board has no rows")]
    NoRows,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unrecognized character '{ch}' in row {row} col {col}")]
    UnknownTile { ch: char, row: usize, col: usize },
}
