use crate::*;
pub use random::*;

mod random;

pub trait BoardGenerator {
    /// Builds a board of `difficulty.card_count()` uniquely identified cards.
    /// Never fails: a misbehaving provider yields a placeholder board.
    fn generate<P: CardProvider + ?Sized>(self, difficulty: Difficulty, provider: &mut P) -> Board;
}
