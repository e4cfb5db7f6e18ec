//! Community feed use-case service.
//!
//! # Responsibility
//! - Publish, edit and delete posts; toggle encouragements; manage comments.
//!
//! # Invariants
//! - Only a post's author may edit or delete it; only a comment's author may
//!   delete the comment. The repository itself never checks ownership.

use crate::model::ids::{CommentId, PostId};
use crate::model::post::{Comment, Post};
use crate::model::{now_epoch_ms, Keyed};
use crate::repo::post_repo::PostRepository;
use crate::service::{normalize_text, ServiceError, ServiceResult};
use crate::session::Identity;
use log::info;

/// Feed service over a post repository.
pub struct FeedService<P: PostRepository> {
    repo: P,
}

impl<P: PostRepository> FeedService<P> {
    pub fn new(repo: P) -> Self {
        Self { repo }
    }

    pub fn create_post(&self, author: &Identity, content: &str) -> ServiceResult<PostId> {
        let mut post = Post::new(
            author.user_id.clone(),
            author.author_name(),
            normalize_text("content", content, true)?,
            now_epoch_ms(),
        );
        post.author_photo_url = author.photo_url.clone();
        let post_id = self.repo.create_post(&post)?;
        info!("event=post_create module=service status=ok");
        Ok(post_id)
    }

    pub fn get_post(&self, post_id: &PostId) -> ServiceResult<Option<Post>> {
        Ok(self.repo.get_post(post_id)?)
    }

    /// Whole feed, newest first.
    pub fn list_feed(&self) -> ServiceResult<Vec<Keyed<PostId, Post>>> {
        let mut posts = self.repo.list_posts()?;
        posts.sort_by(|left, right| {
            right
                .record
                .created_at
                .cmp(&left.record.created_at)
                .then_with(|| right.id.cmp(&left.id))
        });
        Ok(posts)
    }

    pub fn edit_post(
        &self,
        actor: &Identity,
        post_id: &PostId,
        content: &str,
    ) -> ServiceResult<Post> {
        let post = self.require_post(post_id)?;
        if post.author_id != actor.user_id {
            return Err(ServiceError::Forbidden { action: "edit post" });
        }
        let content = normalize_text("content", content, true)?;
        self.repo
            .update_post_content(post_id, &content, now_epoch_ms())?;
        self.require_post(post_id)
    }

    /// Deletes the post with its comments and encouragements.
    pub fn delete_post(&self, actor: &Identity, post_id: &PostId) -> ServiceResult<()> {
        let post = self.require_post(post_id)?;
        if post.author_id != actor.user_id {
            return Err(ServiceError::Forbidden {
                action: "delete post",
            });
        }
        self.repo.delete_post(post_id)?;
        info!(
            "event=post_delete module=service status=ok comments_removed={}",
            post.comments.len()
        );
        Ok(())
    }

    /// Flips the actor's encouragement; returns whether it is now set.
    pub fn toggle_encouragement(&self, actor: &Identity, post_id: &PostId) -> ServiceResult<bool> {
        let post = self.require_post(post_id)?;
        let encouraged = !post.is_encouraged_by(&actor.user_id);
        self.repo
            .set_encouragement(post_id, &actor.user_id, encouraged)?;
        Ok(encouraged)
    }

    pub fn add_comment(
        &self,
        actor: &Identity,
        post_id: &PostId,
        content: &str,
    ) -> ServiceResult<CommentId> {
        self.require_post(post_id)?;
        let comment = Comment {
            author_id: actor.user_id.clone(),
            author_name: actor.author_name(),
            content: normalize_text("comment", content, true)?,
            created_at: now_epoch_ms(),
        };
        Ok(self.repo.add_comment(post_id, &comment)?)
    }

    /// Comments oldest first; empty for unknown posts.
    pub fn list_comments(&self, post_id: &PostId) -> ServiceResult<Vec<Keyed<CommentId, Comment>>> {
        Ok(self.repo.list_comments(post_id)?)
    }

    pub fn delete_comment(
        &self,
        actor: &Identity,
        post_id: &PostId,
        comment_id: &CommentId,
    ) -> ServiceResult<()> {
        let comment = self
            .repo
            .get_comment(post_id, comment_id)?
            .ok_or_else(|| ServiceError::not_found("comment", comment_id))?;
        if comment.author_id != actor.user_id {
            return Err(ServiceError::Forbidden {
                action: "delete comment",
            });
        }
        Ok(self.repo.delete_comment(post_id, comment_id)?)
    }

    fn require_post(&self, post_id: &PostId) -> ServiceResult<Post> {
        self.repo
            .get_post(post_id)?
            .ok_or_else(|| ServiceError::not_found("post", post_id))
    }
}
