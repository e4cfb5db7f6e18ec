//! Conversion between JSON documents and flat leaf rows.
//!
//! # Invariants
//! - Only scalars (string, number, bool) become leaves; `null` and empty
//!   containers produce no rows.
//! - Arrays are flattened with index keys `0..n-1` and read back as objects
//!   keyed by those indices. Record types that hold lists decode them from
//!   that shape themselves.

use super::path::{is_valid_segment, PathError};
use serde_json::{Map, Value};

/// One flattened leaf: path relative to the written location, JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Leaf {
    pub relative: Vec<String>,
    pub encoded: String,
}

pub(crate) fn flatten(value: &Value) -> Result<Vec<Leaf>, PathError> {
    let mut leaves = Vec::new();
    let mut prefix = Vec::new();
    flatten_into(value, &mut prefix, &mut leaves)?;
    Ok(leaves)
}

fn flatten_into(
    value: &Value,
    prefix: &mut Vec<String>,
    out: &mut Vec<Leaf>,
) -> Result<(), PathError> {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                if !is_valid_segment(key) {
                    return Err(PathError::InvalidSegment(key.clone()));
                }
                prefix.push(key.clone());
                flatten_into(child, prefix, out)?;
                prefix.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                prefix.push(index.to_string());
                flatten_into(child, prefix, out)?;
                prefix.pop();
            }
        }
        scalar => out.push(Leaf {
            relative: prefix.clone(),
            encoded: scalar.to_string(),
        }),
    }
    Ok(())
}

/// Rebuilds a document from leaves relative to the read location.
///
/// A leaf with an empty relative path is the value stored directly at the
/// read location.
pub(crate) fn assemble(leaves: Vec<(Vec<String>, Value)>) -> Option<Value> {
    let mut root: Option<Value> = None;
    for (relative, scalar) in leaves {
        if relative.is_empty() {
            return Some(scalar);
        }
        let mut node = root.get_or_insert_with(|| Value::Object(Map::new()));
        for (position, segment) in relative.iter().enumerate() {
            let Value::Object(map) = node else {
                break;
            };
            if position + 1 == relative.len() {
                map.insert(segment.clone(), scalar);
                break;
            }
            node = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }
    root
}
