use alloc::string::{String, ToString};
use hashbrown::HashMap;

use crate::*;

pub const HIGH_SCORE_KEY: &str = "highScore";
pub const DIFFICULTY_KEY: &str = "difficultyLevel";
pub const SOUND_MUTED_KEY: &str = "soundMuted";

/// Durable key/value store that outlives the process.
///
/// Missing keys read as `Ok(None)`.
pub trait Store {
    fn get_int(&self, key: &str) -> core::result::Result<Option<i64>, StoreError>;
    fn set_int(&mut self, key: &str, value: i64) -> core::result::Result<(), StoreError>;
    fn get_string(&self, key: &str) -> core::result::Result<Option<String>, StoreError>;
    fn set_string(&mut self, key: &str, value: &str) -> core::result::Result<(), StoreError>;
    fn get_bool(&self, key: &str) -> core::result::Result<Option<bool>, StoreError>;
    fn set_bool(&mut self, key: &str, value: bool) -> core::result::Result<(), StoreError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum StoredValue {
    Int(i64),
    Text(String),
    Bool(bool),
}

/// Process-local store, for tests and hosts without durable storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, StoredValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn malformed(key: &str) -> StoreError {
        StoreError::Malformed {
            key: key.to_string(),
        }
    }
}

impl Store for MemoryStore {
    fn get_int(&self, key: &str) -> core::result::Result<Option<i64>, StoreError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(StoredValue::Int(value)) => Ok(Some(*value)),
            Some(_) => Err(Self::malformed(key)),
        }
    }

    fn set_int(&mut self, key: &str, value: i64) -> core::result::Result<(), StoreError> {
        self.values.insert(key.to_string(), StoredValue::Int(value));
        Ok(())
    }

    fn get_string(&self, key: &str) -> core::result::Result<Option<String>, StoreError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(StoredValue::Text(value)) => Ok(Some(value.clone())),
            Some(_) => Err(Self::malformed(key)),
        }
    }

    fn set_string(&mut self, key: &str, value: &str) -> core::result::Result<(), StoreError> {
        self.values
            .insert(key.to_string(), StoredValue::Text(value.to_string()));
        Ok(())
    }

    fn get_bool(&self, key: &str) -> core::result::Result<Option<bool>, StoreError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(StoredValue::Bool(value)) => Ok(Some(*value)),
            Some(_) => Err(Self::malformed(key)),
        }
    }

    fn set_bool(&mut self, key: &str, value: bool) -> core::result::Result<(), StoreError> {
        self.values.insert(key.to_string(), StoredValue::Bool(value));
        Ok(())
    }
}

/// Everything the game keeps across restarts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Preferences {
    pub high_score: Score,
    pub difficulty: Difficulty,
    pub muted: bool,
}

impl Preferences {
    /// Reads all keys, falling back to defaults for anything missing or unreadable.
    pub fn load<S: Store + ?Sized>(store: &S) -> Self {
        let high_score = match store.get_int(HIGH_SCORE_KEY) {
            Ok(Some(value)) => Score::try_from(value).unwrap_or_else(|_| {
                log::warn!("stored high score {} out of range, resetting", value);
                0
            }),
            Ok(None) => 0,
            Err(err) => {
                log::warn!("could not read high score: {}", err);
                0
            }
        };

        let difficulty = match store.get_string(DIFFICULTY_KEY) {
            Ok(Some(level)) => Difficulty::parse_or_default(&level),
            Ok(None) => Difficulty::default(),
            Err(err) => {
                log::warn!("could not read difficulty: {}", err);
                Difficulty::default()
            }
        };

        let muted = match store.get_bool(SOUND_MUTED_KEY) {
            Ok(value) => value.unwrap_or(false),
            Err(err) => {
                log::warn!("could not read mute setting: {}", err);
                false
            }
        };

        Self {
            high_score,
            difficulty,
            muted,
        }
    }
}

pub(crate) fn save_high_score<S: Store + ?Sized>(store: &mut S, score: Score) {
    if let Err(err) = store.set_int(HIGH_SCORE_KEY, i64::from(score)) {
        log::warn!("could not save high score: {}", err);
    }
}

pub(crate) fn save_difficulty<S: Store + ?Sized>(store: &mut S, difficulty: Difficulty) {
    if let Err(err) = store.set_string(DIFFICULTY_KEY, difficulty.as_str()) {
        log::warn!("could not save difficulty: {}", err);
    }
}

pub(crate) fn save_muted<S: Store + ?Sized>(store: &mut S, muted: bool) {
    if let Err(err) = store.set_bool(SOUND_MUTED_KEY, muted) {
        log::warn!("could not save mute setting: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_loads_defaults() {
        let prefs = Preferences::load(&MemoryStore::new());

        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.difficulty, Difficulty::Medium);
    }

    #[test]
    fn saved_values_load_back() {
        let mut store = MemoryStore::new();
        save_high_score(&mut store, 9);
        save_difficulty(&mut store, Difficulty::Hard);
        save_muted(&mut store, true);

        let prefs = Preferences::load(&store);

        assert_eq!(prefs.high_score, 9);
        assert_eq!(prefs.difficulty, Difficulty::Hard);
        assert!(prefs.muted);
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set_string(HIGH_SCORE_KEY, "lots").unwrap();
        store.set_string(DIFFICULTY_KEY, "extreme").unwrap();
        store.set_int(SOUND_MUTED_KEY, 1).unwrap();

        assert_eq!(Preferences::load(&store), Preferences::default());
    }

    #[test]
    fn negative_high_score_resets() {
        let mut store = MemoryStore::new();
        store.set_int(HIGH_SCORE_KEY, -4).unwrap();

        assert_eq!(Preferences::load(&store).high_score, 0);
    }
}
