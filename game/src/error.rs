use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::card::CardId;

/// Rejected configuration. Fatal at construction; the round never starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("round duration must be at least one second")]
    ZeroDuration,
    #[error("board size must be even, got {0}")]
    OddBoardSize(usize),
    #[error("board must hold at least one pair")]
    EmptyBoard,
    #[error("alphabet has {available} distinct symbols but {required} pairs are required")]
    InsufficientAlphabet { required: usize, available: usize },
    #[error("symbol {symbol:?} appears {count} times; a layout needs exactly two of each")]
    UnpairedLayout { symbol: String, count: usize },
}

/// Caller contract violations during a round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("no card with id {id} on a board of {board_size}")]
    UnknownCard { id: CardId, board_size: usize },
}

#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("failed to access config at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
