//! Store layout of every record type.
//!
//! ```text
//! users/{userId}                         profile fields
//! users/{userId}/goals/{goalId}
//! users/{userId}/tasks/{taskId}
//! users/{userId}/journal/{entryId}
//! posts/{postId}
//! posts/{postId}/comments/{commentId}
//! posts/{postId}/encouragements/{userId}
//! ```

use crate::model::ids::{CommentId, GoalId, JournalEntryId, PostId, TaskId, UserId};
use crate::store::{PathError, StorePath};

pub const USERS: &str = "users";
pub const GOALS: &str = "goals";
pub const TASKS: &str = "tasks";
pub const JOURNAL: &str = "journal";
pub const POSTS: &str = "posts";
pub const COMMENTS: &str = "comments";
pub const ENCOURAGEMENTS: &str = "encouragements";

pub fn user(user_id: &UserId) -> Result<StorePath, PathError> {
    StorePath::from_segments([USERS, user_id.as_str()])
}

pub fn goals(user_id: &UserId) -> Result<StorePath, PathError> {
    user(user_id)?.child(GOALS)
}

pub fn goal(user_id: &UserId, goal_id: &GoalId) -> Result<StorePath, PathError> {
    goals(user_id)?.child(goal_id.as_str())
}

pub fn tasks(user_id: &UserId) -> Result<StorePath, PathError> {
    user(user_id)?.child(TASKS)
}

pub fn task(user_id: &UserId, task_id: &TaskId) -> Result<StorePath, PathError> {
    tasks(user_id)?.child(task_id.as_str())
}

pub fn journal(user_id: &UserId) -> Result<StorePath, PathError> {
    user(user_id)?.child(JOURNAL)
}

pub fn journal_entry(user_id: &UserId, entry_id: &JournalEntryId) -> Result<StorePath, PathError> {
    journal(user_id)?.child(entry_id.as_str())
}

pub fn posts() -> Result<StorePath, PathError> {
    StorePath::parse(POSTS)
}

pub fn post(post_id: &PostId) -> Result<StorePath, PathError> {
    posts()?.child(post_id.as_str())
}

pub fn comments(post_id: &PostId) -> Result<StorePath, PathError> {
    post(post_id)?.child(COMMENTS)
}

pub fn comment(post_id: &PostId, comment_id: &CommentId) -> Result<StorePath, PathError> {
    comments(post_id)?.child(comment_id.as_str())
}

pub fn encouragement(post_id: &PostId, user_id: &UserId) -> Result<StorePath, PathError> {
    post(post_id)?.child(ENCOURAGEMENTS)?.child(user_id.as_str())
}

#[cfg(test)]
mod tests {
    use super::{comment, encouragement, goal, journal_entry};

    #[test]
    fn record_paths_follow_layout() {
        let user = "u1".parse().unwrap();
        assert_eq!(
            goal(&user, &"g1".parse().unwrap()).unwrap().as_key(),
            "users/u1/goals/g1"
        );
        assert_eq!(
            journal_entry(&user, &"j1".parse().unwrap())
                .unwrap()
                .as_key(),
            "users/u1/journal/j1"
        );
        let post = "p1".parse().unwrap();
        assert_eq!(
            comment(&post, &"c1".parse().unwrap()).unwrap().as_key(),
            "posts/p1/comments/c1"
        );
        assert_eq!(
            encouragement(&post, &user).unwrap().as_key(),
            "posts/p1/encouragements/u1"
        );
    }
}
