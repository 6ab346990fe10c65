use gloo::storage::{LocalStorage, Storage};
use memoro_core::{Store, StoreError};

/// Browser local storage, holding plain strings so values stay readable
/// from the devtools (`highScore` = `"7"`, `soundMuted` = `"true"`).
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct LocalStore;

impl LocalStore {
    fn read(key: &str) -> Result<Option<String>, StoreError> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|err| StoreError::Unavailable(format!("{err:?}")))
    }

    fn write(key: &str, value: &str) -> Result<(), StoreError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| StoreError::Unavailable(format!("{err:?}")))
    }

    fn malformed(key: &str) -> StoreError {
        StoreError::Malformed {
            key: key.to_string(),
        }
    }
}

impl Store for LocalStore {
    fn get_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        Self::read(key)?
            .map(|value| value.trim().parse().map_err(|_| Self::malformed(key)))
            .transpose()
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        Self::write(key, &value.to_string())
    }

    fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::read(key)
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::write(key, value)
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, StoreError> {
        Self::read(key)?
            .map(|value| match value.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Self::malformed(key)),
            })
            .transpose()
    }

    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), StoreError> {
        Self::write(key, if value { "true" } else { "false" })
    }
}
