// Domain-level errors for session bookkeeping and match setup.

use std::fmt;

use super::session::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    UnknownPlayer { player_id: PlayerId },
    // The winner is write-once per match.
    WinnerConflict { current: PlayerId, requested: PlayerId },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::UnknownPlayer { player_id } => {
                write!(f, "player {player_id} is not part of this session")
            }
            SessionError::WinnerConflict { current, requested } => {
                write!(f, "winner already set to {current}, refusing {requested}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Errors that prevent a match from starting.
#[derive(Debug, Clone, PartialEq)]
pub enum SetupError {
    EmptyRoster,
    // Roster entry whose id is blank after trimming; `index` is its roster position.
    BlankPlayerId { index: usize },
    DuplicatePlayer { player_id: PlayerId },
    MissingSpawn { player_id: PlayerId },
    InvalidAttribute {
        player_id: PlayerId,
        attribute: &'static str,
        value: f32,
    },
    Backend(String),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::EmptyRoster => write!(f, "roster has no players"),
            SetupError::BlankPlayerId { index } => {
                write!(f, "roster entry {index} has a blank player id")
            }
            SetupError::DuplicatePlayer { player_id } => {
                write!(f, "player {player_id} appears more than once in the roster")
            }
            SetupError::MissingSpawn { player_id } => {
                write!(f, "player {player_id} has no spawn coordinates")
            }
            SetupError::InvalidAttribute {
                player_id,
                attribute,
                value,
            } => write!(f, "player {player_id} has invalid {attribute}: {value}"),
            SetupError::Backend(message) => write!(f, "simulation backend failed: {message}"),
        }
    }
}

impl std::error::Error for SetupError {}
