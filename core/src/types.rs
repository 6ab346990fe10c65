use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::GameError;

/// Identity of a card, unique within one board.
pub type CardId = u16;

/// Score and card-count type; a score never exceeds the board size.
pub type Score = u16;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub const fn card_count(self) -> Score {
        match self {
            Self::Easy => 8,
            Self::Medium => 12,
            Self::Hard => 16,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Lenient parse used for stored and user-provided levels: anything
    /// unrecognized is medium.
    pub fn parse_or_default(level: &str) -> Self {
        level.parse().unwrap_or_else(|_| {
            log::debug!("unknown difficulty {:?}, using medium", level);
            Self::default()
        })
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(GameError::UnknownDifficulty)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn card_count_for_difficulty(level: &str) -> Score {
    Difficulty::parse_or_default(level).card_count()
}

/// Identifies one playthrough, from board request to the next board request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
