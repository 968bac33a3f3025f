//! Persisted "shown" flags.
//!
//! The overlay only ever needs two things from storage: read a boolean by key
//! and set it. Backends are interchangeable behind [`FlagStore`]; callers are
//! expected to treat every error as "flag absent" / "write ignored".

mod json;
mod memory;
mod sqlite;

pub use json::JsonFlagStore;
pub use memory::MemoryFlagStore;
pub use sqlite::SqliteFlagStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed flag file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub trait FlagStore {
    /// `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<bool>, StoreError>;
    fn set(&mut self, key: &str, value: bool) -> Result<(), StoreError>;
    fn clear(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<T: FlagStore + ?Sized> FlagStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<bool>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: bool) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).clear(key)
    }
}
