//! Error handling
//!
//! Two tiers. Recoverable lookups (an unknown species name, a monster id
//! that is no longer on the level) return [`EngineError`]. Programmer
//! errors that would leave the game in an undefined state go through
//! [`fatal`], which logs and panics.

use thiserror::Error;

use crate::actor::MonsterId;
use crate::level::LevelId;

/// Recoverable engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("No monster {0:?} on the current level")]
    NoSuchMonster(MonsterId),

    #[error("Level {0} does not exist")]
    NoSuchLevel(LevelId),

    #[error("Cell ({x}, {y}) is not available for placement")]
    CellUnavailable { x: i16, y: i16 },

    #[error(transparent)]
    Options(#[from] crate::options::OptionsError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Report an unrecoverable internal error and panic.
#[track_caller]
pub fn fatal(message: &str) -> ! {
    log::error!("fatal: {message}");
    panic!("engine error: {message}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Branch;

    #[test]
    fn test_error_display() {
        let err = EngineError::UnknownSpecies("wumpus".to_string());
        assert_eq!(err.to_string(), "Unknown species: wumpus");

        let err = EngineError::NoSuchLevel(LevelId::new(Branch::Lair, 3));
        assert_eq!(err.to_string(), "Level Lair:3 does not exist");
    }

    #[test]
    #[should_panic(expected = "engine error: broken")]
    fn test_fatal_panics() {
        fatal("broken");
    }
}
