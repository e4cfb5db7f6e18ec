//! Hierarchical key-value document store.
//!
//! # Responsibility
//! - Define the `get`/`set`/`update`/`remove`/`push` contract the data-access
//!   layer is written against.
//! - Provide the SQLite-backed implementation used by the app and tests.
//!
//! # Invariants
//! - Reads never fail for "not found"; absence is `Ok(None)`.
//! - `update` replaces each named child wholesale and leaves siblings alone.
//!   Two sessions updating different fields of one record both persist.
//! - Pushed keys are unique, never reused and sort in creation order.

use crate::db::DbError;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod path;
mod sqlite_store;
mod tree;

pub use path::{PathError, StorePath};
pub use sqlite_store::SqliteDocumentStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Transport/encoding failure from a document store.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Path(PathError),
    /// A stored leaf is not valid JSON.
    Corrupt { path: String, message: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Path(err) => write!(f, "{err}"),
            Self::Corrupt { path, message } => {
                write!(f, "corrupt stored value at `{path}`: {message}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Path(err) => Some(err),
            Self::Corrupt { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<PathError> for StoreError {
    fn from(value: PathError) -> Self {
        Self::Path(value)
    }
}

/// Path-addressed document store operations.
pub trait DocumentStore {
    /// Reads the subtree at `path`.
    fn get(&self, path: &StorePath) -> StoreResult<Option<Value>>;
    /// Overwrites the subtree at `path`. `null` removes it.
    fn set(&self, path: &StorePath, value: &Value) -> StoreResult<()>;
    /// Replaces each child named in `fields` (keys may be relative paths).
    fn update(&self, path: &StorePath, fields: &Map<String, Value>) -> StoreResult<()>;
    /// Removes the subtree at `path`; absent paths are a no-op.
    fn remove(&self, path: &StorePath) -> StoreResult<()>;

    /// Generates a fresh child location under `path` without writing.
    fn push(&self, path: &StorePath) -> StoreResult<StorePath> {
        Ok(path.child(&new_push_key())?)
    }

    /// Pushes and writes `value` at the new child location.
    fn push_value(&self, path: &StorePath, value: &Value) -> StoreResult<StorePath> {
        let child = self.push(path)?;
        self.set(&child, value)?;
        Ok(child)
    }
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn get(&self, path: &StorePath) -> StoreResult<Option<Value>> {
        (**self).get(path)
    }

    fn set(&self, path: &StorePath, value: &Value) -> StoreResult<()> {
        (**self).set(path, value)
    }

    fn update(&self, path: &StorePath, fields: &Map<String, Value>) -> StoreResult<()> {
        (**self).update(path, fields)
    }

    fn remove(&self, path: &StorePath) -> StoreResult<()> {
        (**self).remove(path)
    }

    fn push(&self, path: &StorePath) -> StoreResult<StorePath> {
        (**self).push(path)
    }
}

/// Time-ordered unique key (UUID v7, hyphenated lowercase).
pub fn new_push_key() -> String {
    Uuid::now_v7().to_string()
}
