use serde::{Deserialize, Serialize};

use crate::*;

/// Mutating entry points that must pass the guard before touching a session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    Click,
    ChangeDifficulty,
    PlayAgain,
    Dismiss,
}

/// The single lock on a session's input.
///
/// Set synchronously the moment a click ends the game, before any feedback
/// is dispatched, so the next call observes it no matter how soon it comes.
/// Only a new session or dismissing the end screen opens it again.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Guard {
    #[default]
    Open,
    Locked,
}

impl Guard {
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::Locked)
    }

    /// First check of every mutating entry point.
    pub fn enter(self, entry: Entry) -> Result<()> {
        match self {
            Self::Open => Ok(()),
            Self::Locked => {
                log::debug!("{:?} rejected, input is locked", entry);
                Err(GameError::Locked)
            }
        }
    }

    /// Locks; returns `false` when it was already locked.
    pub(crate) fn lock(&mut self) -> bool {
        !core::mem::replace(self, Self::Locked).is_locked()
    }

    pub(crate) fn release(&mut self) {
        *self = Self::Open;
    }
}
