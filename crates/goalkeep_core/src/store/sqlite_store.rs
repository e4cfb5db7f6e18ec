//! SQLite implementation of `DocumentStore`.
//!
//! # Responsibility
//! - Persist documents as one `store_nodes` row per scalar leaf.
//! - Keep each `set`/`update`/`remove` inside a single `IMMEDIATE`
//!   transaction; concurrent writers queue on the busy timeout.
//!
//! # Invariants
//! - A subtree `p` is the row `p` plus every row in `[p + "/", p + "0")`;
//!   `'0'` is the byte after `'/'`, so the range needs no LIKE escaping.
//! - Writing below a path first drops any scalar stored at an ancestor, so a
//!   location never holds both a scalar and children.

use super::path::StorePath;
use super::tree::{assemble, flatten};
use super::{DocumentStore, StoreError, StoreResult};
use log::{debug, error};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use serde_json::{Map, Value};
use std::time::Instant;

/// Document store over a migrated SQLite connection.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn write<F>(&self, op: &'static str, path: &StorePath, f: F) -> StoreResult<()>
    where
        F: FnOnce(&Transaction<'_>) -> StoreResult<usize>,
    {
        let started_at = Instant::now();
        let result = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(StoreError::from)
            .and_then(|tx| {
                let touched = f(&tx)?;
                tx.commit()?;
                Ok(touched)
            });

        match result {
            Ok(leaves) => {
                debug!(
                    "event=store_write module=store op={} status=ok path={} leaves={} duration_ms={}",
                    op,
                    path,
                    leaves,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_write module=store op={} status=error path={} duration_ms={} error={}",
                    op,
                    path,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn get(&self, path: &StorePath) -> StoreResult<Option<Value>> {
        let started_at = Instant::now();
        let key = path.as_key();
        let (lower, upper) = subtree_bounds(&key);

        let mut stmt = self.conn.prepare_cached(
            "SELECT path, value
             FROM store_nodes
             WHERE path = ?1
                OR (path >= ?2 AND path < ?3)
             ORDER BY path ASC;",
        )?;
        let mut rows = stmt.query(params![key, lower, upper])?;
        let mut leaves = Vec::new();
        while let Some(row) = rows.next()? {
            let leaf_path: String = row.get(0)?;
            let encoded: String = row.get(1)?;
            let scalar: Value =
                serde_json::from_str(&encoded).map_err(|err| StoreError::Corrupt {
                    path: leaf_path.clone(),
                    message: err.to_string(),
                })?;
            let relative = leaf_path
                .get(key.len()..)
                .unwrap_or_default()
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>();
            leaves.push((relative, scalar));
        }

        let leaf_count = leaves.len();
        let value = assemble(leaves);
        debug!(
            "event=store_read module=store status=ok path={} leaves={} found={} duration_ms={}",
            path,
            leaf_count,
            value.is_some(),
            started_at.elapsed().as_millis()
        );
        Ok(value)
    }

    fn set(&self, path: &StorePath, value: &Value) -> StoreResult<()> {
        self.write("set", path, |tx| replace_subtree(tx, path, value))
    }

    fn update(&self, path: &StorePath, fields: &Map<String, Value>) -> StoreResult<()> {
        let targets = fields
            .iter()
            .map(|(relative, value)| -> StoreResult<(StorePath, &Value)> {
                Ok((path.join(relative)?, value))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        self.write("update", path, |tx| {
            let mut touched = 0;
            for (target, value) in &targets {
                touched += replace_subtree(tx, target, value)?;
            }
            Ok(touched)
        })
    }

    fn remove(&self, path: &StorePath) -> StoreResult<()> {
        self.write("remove", path, |tx| delete_subtree(tx, path))
    }
}

fn replace_subtree(tx: &Transaction<'_>, path: &StorePath, value: &Value) -> StoreResult<usize> {
    let leaves = flatten(value)?;
    let removed = delete_subtree(tx, path)?;
    if leaves.is_empty() {
        return Ok(removed);
    }

    for ancestor in path.ancestors() {
        tx.execute(
            "DELETE FROM store_nodes WHERE path = ?1;",
            [ancestor.as_key()],
        )?;
    }

    let base = path.as_key();
    let mut insert = tx.prepare_cached(
        "INSERT INTO store_nodes (path, value, updated_at)
         VALUES (?1, ?2, (strftime('%s', 'now') * 1000));",
    )?;
    for leaf in &leaves {
        let leaf_path = if leaf.relative.is_empty() {
            base.clone()
        } else {
            format!("{base}/{}", leaf.relative.join("/"))
        };
        insert.execute(params![leaf_path, leaf.encoded])?;
    }

    Ok(removed + leaves.len())
}

fn delete_subtree(tx: &Transaction<'_>, path: &StorePath) -> StoreResult<usize> {
    let key = path.as_key();
    let (lower, upper) = subtree_bounds(&key);
    let removed = tx.execute(
        "DELETE FROM store_nodes
         WHERE path = ?1
            OR (path >= ?2 AND path < ?3);",
        params![key, lower, upper],
    )?;
    Ok(removed)
}

fn subtree_bounds(key: &str) -> (String, String) {
    (format!("{key}/"), format!("{key}0"))
}

#[cfg(test)]
mod tests {
    use super::{subtree_bounds, SqliteDocumentStore};
    use crate::db::open_db_in_memory;
    use crate::store::{DocumentStore, StorePath};
    use serde_json::json;

    fn path(raw: &str) -> StorePath {
        StorePath::parse(raw).unwrap()
    }

    #[test]
    fn subtree_bounds_exclude_sibling_prefixes() {
        let (lower, upper) = subtree_bounds("users/u1");
        assert!("users/u1/goals".to_string() >= lower);
        assert!("users/u1/goals".to_string() < upper);
        assert!("users/u10".to_string() >= upper);
        assert!("users/u1-x".to_string() < lower);
    }

    #[test]
    fn get_missing_path_returns_none() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::new(&conn);
        assert_eq!(store.get(&path("users/nobody")).unwrap(), None);
    }

    #[test]
    fn sibling_keys_with_shared_prefix_do_not_leak() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::new(&conn);
        store.set(&path("users/u1/name"), &json!("one")).unwrap();
        store.set(&path("users/u10/name"), &json!("ten")).unwrap();

        assert_eq!(
            store.get(&path("users/u1")).unwrap(),
            Some(json!({"name": "one"}))
        );
        store.remove(&path("users/u1")).unwrap();
        assert_eq!(
            store.get(&path("users/u10")).unwrap(),
            Some(json!({"name": "ten"}))
        );
    }

    #[test]
    fn set_overwrites_whole_subtree_and_scalar_ancestors() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::new(&conn);
        store
            .set(&path("doc"), &json!({"a": 1, "b": {"c": true}}))
            .unwrap();
        store.set(&path("doc"), &json!({"a": 2})).unwrap();
        assert_eq!(store.get(&path("doc")).unwrap(), Some(json!({"a": 2})));

        store.set(&path("doc/a/deep"), &json!("x")).unwrap();
        assert_eq!(
            store.get(&path("doc")).unwrap(),
            Some(json!({"a": {"deep": "x"}}))
        );
    }

    #[test]
    fn update_accepts_relative_paths_and_null_removal() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::new(&conn);
        store
            .set(
                &path("goal"),
                &json!({"title": "t", "note": "n", "milestones": [{"text": "m", "completed": false}]}),
            )
            .unwrap();

        let fields = json!({"milestones/0/completed": true, "note": null});
        store
            .update(&path("goal"), fields.as_object().unwrap())
            .unwrap();

        assert_eq!(
            store.get(&path("goal")).unwrap(),
            Some(json!({"title": "t", "milestones": {"0": {"text": "m", "completed": true}}}))
        );
    }
}
