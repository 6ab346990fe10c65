use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::ops::Index;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Ordered arrangement of cards as currently shown to the player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    /// Assigns sequential ids `0..faces.len()` in delivery order.
    pub fn from_faces(faces: Vec<CardFace>) -> Self {
        let cards = faces
            .into_iter()
            .zip(0..)
            .map(|(face, id)| Card::new(id, face))
            .collect();
        Self { cards }
    }

    pub fn from_cards(cards: Vec<Card>) -> Result<Self> {
        let board = Self { cards };
        board.validate()?;
        Ok(board)
    }

    /// Checks that no two cards share an id.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for card in &self.cards {
            if !seen.insert(card.id()) {
                return Err(GameError::DuplicateCardId(card.id()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.cards.iter().map(Card::id)
    }

    pub fn position_of(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|card| card.id() == id)
    }

    pub fn revealed_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_revealed()).count()
    }

    pub fn shuffle(&mut self, rng: &mut SmallRng) {
        shuffle(&mut self.cards, rng);
    }

    pub(crate) fn card_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }
}

impl Index<usize> for Board {
    type Output = Card;

    fn index(&self, index: usize) -> &Self::Output {
        &self.cards[index]
    }
}
