use rand::prelude::*;

use super::*;

/// Fetches card faces from a provider and deals them in a seeded random order.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate<P: CardProvider + ?Sized>(self, difficulty: Difficulty, provider: &mut P) -> Board {
        let count = difficulty.card_count();

        let faces = match provider.fetch(difficulty, count) {
            Ok(faces) if faces.len() == usize::from(count) => faces,
            Ok(faces) => {
                let err = ProviderError::ShortRead {
                    expected: count,
                    actual: faces.len(),
                };
                log::warn!("{}, dealing placeholder cards", err);
                placeholder_faces(count)
            }
            Err(err) => {
                log::warn!("{}, dealing placeholder cards", err);
                placeholder_faces(count)
            }
        };

        let mut board = Board::from_faces(faces);
        let mut rng = SmallRng::seed_from_u64(self.seed);
        board.shuffle(&mut rng);
        board
    }
}

/// In-place Fisher-Yates: walks from the last slot down, swapping each with a
/// uniformly chosen slot in `[0, i]`.
pub fn shuffle<T>(items: &mut [T], rng: &mut SmallRng) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}
