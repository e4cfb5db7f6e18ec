//! Community post repository.
//!
//! # Invariants
//! - Posts are global (`posts/{postId}`); ownership is a field, not a path.
//! - Comments and encouragements are children of the post node.
//! - `update_post` never touches `comments`/`encouragements`.

use crate::model::ids::{CommentId, PostId, UserId};
use crate::model::post::{Comment, Post};
use crate::model::{EpochMs, Keyed};
use crate::repo::{decode, decode_collection, encode, paths, RepoResult};
use crate::store::DocumentStore;
use serde_json::{Map, Value};

/// Repository interface for posts, comments and encouragements.
pub trait PostRepository {
    fn create_post(&self, post: &Post) -> RepoResult<PostId>;
    fn get_post(&self, post_id: &PostId) -> RepoResult<Option<Post>>;
    /// Whole feed, oldest first.
    fn list_posts(&self) -> RepoResult<Vec<Keyed<PostId, Post>>>;
    fn update_post_content(
        &self,
        post_id: &PostId,
        content: &str,
        edited_at: EpochMs,
    ) -> RepoResult<()>;
    fn delete_post(&self, post_id: &PostId) -> RepoResult<()>;
    /// Sets (`true`) or removes (`false`) one user's encouragement mark.
    fn set_encouragement(
        &self,
        post_id: &PostId,
        user_id: &UserId,
        encouraged: bool,
    ) -> RepoResult<()>;
    fn add_comment(&self, post_id: &PostId, comment: &Comment) -> RepoResult<CommentId>;
    fn get_comment(&self, post_id: &PostId, comment_id: &CommentId)
        -> RepoResult<Option<Comment>>;
    fn list_comments(&self, post_id: &PostId) -> RepoResult<Vec<Keyed<CommentId, Comment>>>;
    fn delete_comment(&self, post_id: &PostId, comment_id: &CommentId) -> RepoResult<()>;
}

/// Post repository over any `DocumentStore`.
pub struct StorePostRepository<S> {
    store: S,
}

impl<S: DocumentStore> StorePostRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: DocumentStore> PostRepository for StorePostRepository<S> {
    fn create_post(&self, post: &Post) -> RepoResult<PostId> {
        let path = self.store.push(&paths::posts()?)?;
        self.store.set(&path, &encode(&path, post)?)?;
        Ok(PostId::parse(path.key())?)
    }

    fn get_post(&self, post_id: &PostId) -> RepoResult<Option<Post>> {
        let path = paths::post(post_id)?;
        match self.store.get(&path)? {
            Some(value) => Ok(Some(decode(&path, value)?)),
            None => Ok(None),
        }
    }

    fn list_posts(&self) -> RepoResult<Vec<Keyed<PostId, Post>>> {
        let path = paths::posts()?;
        let snapshot = self.store.get(&path)?;
        decode_collection(&path, snapshot, PostId::parse)
    }

    fn update_post_content(
        &self,
        post_id: &PostId,
        content: &str,
        edited_at: EpochMs,
    ) -> RepoResult<()> {
        let mut fields = Map::new();
        fields.insert("content".into(), Value::from(content));
        fields.insert("editedAt".into(), Value::from(edited_at));
        self.store.update(&paths::post(post_id)?, &fields)?;
        Ok(())
    }

    fn delete_post(&self, post_id: &PostId) -> RepoResult<()> {
        self.store.remove(&paths::post(post_id)?)?;
        Ok(())
    }

    fn set_encouragement(
        &self,
        post_id: &PostId,
        user_id: &UserId,
        encouraged: bool,
    ) -> RepoResult<()> {
        let path = paths::encouragement(post_id, user_id)?;
        if encouraged {
            self.store.set(&path, &Value::Bool(true))?;
        } else {
            self.store.remove(&path)?;
        }
        Ok(())
    }

    fn add_comment(&self, post_id: &PostId, comment: &Comment) -> RepoResult<CommentId> {
        let path = self.store.push(&paths::comments(post_id)?)?;
        self.store.set(&path, &encode(&path, comment)?)?;
        Ok(CommentId::parse(path.key())?)
    }

    fn get_comment(
        &self,
        post_id: &PostId,
        comment_id: &CommentId,
    ) -> RepoResult<Option<Comment>> {
        let path = paths::comment(post_id, comment_id)?;
        match self.store.get(&path)? {
            Some(value) => Ok(Some(decode(&path, value)?)),
            None => Ok(None),
        }
    }

    fn list_comments(&self, post_id: &PostId) -> RepoResult<Vec<Keyed<CommentId, Comment>>> {
        let path = paths::comments(post_id)?;
        let snapshot = self.store.get(&path)?;
        decode_collection(&path, snapshot, CommentId::parse)
    }

    fn delete_comment(&self, post_id: &PostId, comment_id: &CommentId) -> RepoResult<()> {
        self.store.remove(&paths::comment(post_id, comment_id)?)?;
        Ok(())
    }
}
