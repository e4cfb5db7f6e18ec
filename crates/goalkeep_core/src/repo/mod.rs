//! Data-access layer: per-entity CRUD over the document store.
//!
//! # Responsibility
//! - Map each record type onto its store path.
//! - Translate records to path-addressed writes and snapshots back to records.
//!
//! # Invariants
//! - Reads return `None`/empty collections for missing data, never an error.
//! - Updates are field-level merges; deletes remove the whole subtree.
//! - Repositories check neither ownership nor references; services do.
//! - A single record that cannot be decoded is reported as `InvalidData`.
//!   Inside a collection read it is skipped with a `warn` event, so one
//!   partial record (e.g. an update that landed after a delete) never hides
//!   its siblings.

use crate::model::Keyed;
use crate::store::{PathError, StoreError, StorePath};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod goal_repo;
pub mod journal_repo;
pub mod paths;
pub mod post_repo;
pub mod task_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for store transport and record decoding.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    InvalidData { path: String, message: String },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidData { path, message } => {
                write!(f, "invalid stored record at `{path}`: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidData { .. } => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<PathError> for RepoError {
    fn from(value: PathError) -> Self {
        Self::Store(StoreError::Path(value))
    }
}

pub(crate) fn encode<T: Serialize>(path: &StorePath, record: &T) -> RepoResult<Value> {
    serde_json::to_value(record).map_err(|err| RepoError::InvalidData {
        path: path.as_key(),
        message: err.to_string(),
    })
}

pub(crate) fn decode<T: DeserializeOwned>(path: &StorePath, value: Value) -> RepoResult<T> {
    serde_json::from_value(value).map_err(|err| RepoError::InvalidData {
        path: path.as_key(),
        message: err.to_string(),
    })
}

/// Decodes a collection snapshot into key-ordered records.
///
/// Entries that do not decode are logged and left out of the result.
pub(crate) fn decode_collection<I, T>(
    path: &StorePath,
    snapshot: Option<Value>,
    parse_id: impl Fn(&str) -> Result<I, PathError>,
) -> RepoResult<Vec<Keyed<I, T>>>
where
    T: DeserializeOwned,
{
    let entries = match snapshot {
        None => return Ok(Vec::new()),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            warn!(
                "event=collection_decode module=repo status=skipped path={} found={}",
                path.as_key(),
                kind_of(&other)
            );
            return Ok(Vec::new());
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let record_path = path.child(&key)?;
        let decoded = parse_id(&key).map_err(RepoError::from).and_then(|id| {
            let record = decode(&record_path, value)?;
            Ok(Keyed { id, record })
        });
        match decoded {
            Ok(keyed) => records.push(keyed),
            Err(err) => warn!(
                "event=record_decode module=repo status=skipped path={} error={}",
                record_path.as_key(),
                err
            ),
        }
    }
    Ok(records)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
