use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::CardId;

/// Opaque handle to a card's artwork; the core never interprets it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtworkRef(String);

impl ArtworkRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtworkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Card content as delivered by a data source, before it gets an identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFace {
    pub name: String,
    pub artwork: ArtworkRef,
}

impl CardFace {
    pub fn new(name: impl Into<String>, artwork: ArtworkRef) -> Self {
        Self {
            name: name.into(),
            artwork,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    name: String,
    artwork: ArtworkRef,
    revealed: bool,
}

impl Card {
    pub fn new(id: CardId, face: CardFace) -> Self {
        Self {
            id,
            name: face.name,
            artwork: face.artwork,
            revealed: false,
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artwork(&self) -> &ArtworkRef {
        &self.artwork
    }

    /// Display aid only; duplicate detection never looks at this flag.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub(crate) fn reveal(&mut self) {
        self.revealed = true;
    }
}
