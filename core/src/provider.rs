use alloc::format;
use alloc::vec::Vec;
use rand::prelude::*;

use crate::*;

/// External source of card content.
pub trait CardProvider {
    /// Returns `count` distinct card faces for a board of the given difficulty.
    fn fetch(
        &mut self,
        difficulty: Difficulty,
        count: Score,
    ) -> core::result::Result<Vec<CardFace>, ProviderError>;
}

pub const PLACEHOLDER_ARTWORK_PREFIX: &str = "placeholder:";

/// Deterministic stand-in faces, `card-1`..`card-{count}`.
pub fn placeholder_faces(count: Score) -> Vec<CardFace> {
    (1..=count)
        .map(|n| {
            CardFace::new(
                format!("card-{n}"),
                ArtworkRef::new(format!("{PLACEHOLDER_ARTWORK_PREFIX}{n}")),
            )
        })
        .collect()
}

pub const SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/";

const CATALOG: [&str; 40] = [
    "bulbasaur",
    "ivysaur",
    "venusaur",
    "charmander",
    "charmeleon",
    "charizard",
    "squirtle",
    "wartortle",
    "blastoise",
    "caterpie",
    "metapod",
    "butterfree",
    "weedle",
    "kakuna",
    "beedrill",
    "pidgey",
    "pidgeotto",
    "pidgeot",
    "rattata",
    "raticate",
    "spearow",
    "fearow",
    "ekans",
    "arbok",
    "pikachu",
    "raichu",
    "sandshrew",
    "sandslash",
    "nidoran-f",
    "nidorina",
    "nidoqueen",
    "nidoran-m",
    "nidorino",
    "nidoking",
    "clefairy",
    "clefable",
    "vulpix",
    "ninetales",
    "jigglypuff",
    "wigglytuff",
];

/// Built-in card source: a window of consecutive catalog entries starting at
/// a random offset, so consecutive games deal different cards.
#[derive(Clone, Debug)]
pub struct CatalogProvider {
    rng: SmallRng,
}

impl CatalogProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub const fn catalog_len() -> usize {
        CATALOG.len()
    }
}

impl CardProvider for CatalogProvider {
    fn fetch(
        &mut self,
        _difficulty: Difficulty,
        count: Score,
    ) -> core::result::Result<Vec<CardFace>, ProviderError> {
        let wanted = usize::from(count);
        if wanted > CATALOG.len() {
            return Err(ProviderError::ShortRead {
                expected: count,
                actual: CATALOG.len(),
            });
        }

        let offset = self.rng.random_range(0..CATALOG.len());
        let faces = (0..wanted)
            .map(|i| {
                let index = (offset + i) % CATALOG.len();
                CardFace::new(
                    CATALOG[index],
                    ArtworkRef::new(format!("{SPRITE_BASE_URL}{}.png", index + 1)),
                )
            })
            .collect();
        Ok(faces)
    }
}
