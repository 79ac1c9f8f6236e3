//! Error types for loading, configuration and strategy execution

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::moves::ParseMoveError;
use crate::vm::BytecodeError;

/// Errors that stop a tournament from starting or advancing
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("players' directory not found: {}", .0.display())]
    DiscoveryMissing(PathBuf),

    #[error("players' location is not a directory: {}", .0.display())]
    DiscoveryNotDirectory(PathBuf),

    #[error("failed to scan players' directory {}: {source}", .path.display())]
    DiscoveryIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("tournament has not been started")]
    NotStarted,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Why a strategy could not be built or could not produce a move
///
/// During a match any of these forfeits the turn.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("bytecode rejected: {0}")]
    InvalidBytecode(#[from] BytecodeError),

    #[error("bytecode faulted on turn {turn}")]
    Fault { turn: u32 },

    #[error("strategy process I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("strategy process gave no move within {0:?}")]
    Timeout(Duration),

    #[error("strategy process closed its output")]
    Disconnected,

    #[error("strategy process replied badly: {0}")]
    BadReply(#[from] ParseMoveError),

    #[error("strategy played no move")]
    NoMove,

    #[error("strategy process was stopped after {0} consecutive timeouts")]
    Retired(u32),
}
