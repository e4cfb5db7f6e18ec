//! Community post and comment records.

use super::ids::{CommentId, UserId};
use super::EpochMs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Community feed item.
///
/// `encouragements` and `comments` are child collections of the post node,
/// so deleting the post removes them too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub author_id: UserId,
    pub author_name: String,
    #[serde(
        rename = "authorPhotoURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub author_photo_url: Option<String>,
    pub content: String,
    #[serde(default)]
    pub created_at: EpochMs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<EpochMs>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub encouragements: BTreeMap<UserId, bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub comments: BTreeMap<CommentId, Comment>,
}

impl Post {
    pub fn new(
        author_id: UserId,
        author_name: impl Into<String>,
        content: impl Into<String>,
        created_at: EpochMs,
    ) -> Self {
        Self {
            author_id,
            author_name: author_name.into(),
            author_photo_url: None,
            content: content.into(),
            created_at,
            edited_at: None,
            encouragements: BTreeMap::new(),
            comments: BTreeMap::new(),
        }
    }

    pub fn encouragement_count(&self) -> usize {
        self.encouragements.values().filter(|marked| **marked).count()
    }

    pub fn is_encouraged_by(&self, user_id: &UserId) -> bool {
        self.encouragements.get(user_id).copied().unwrap_or(false)
    }
}

/// Comment on a post, owned by its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub author_id: UserId,
    pub author_name: String,
    pub content: String,
    #[serde(default)]
    pub created_at: EpochMs,
}
