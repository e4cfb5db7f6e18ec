//! Goal repository contract and store-backed implementation.
//!
//! # Invariants
//! - Goals live under `users/{userId}/goals/{goalId}`.
//! - `delete_goal` removes only the goal node; tasks pointing at it remain.

use crate::model::goal::{Goal, GoalPatch};
use crate::model::ids::{GoalId, UserId};
use crate::model::Keyed;
use crate::repo::{decode, decode_collection, encode, paths, RepoResult};
use crate::store::DocumentStore;

/// Repository interface for goal CRUD.
pub trait GoalRepository {
    /// Pushes a new goal and returns its store-assigned id.
    fn create_goal(&self, user_id: &UserId, goal: &Goal) -> RepoResult<GoalId>;
    fn get_goal(&self, user_id: &UserId, goal_id: &GoalId) -> RepoResult<Option<Goal>>;
    /// Every goal of the user, oldest first.
    fn list_goals(&self, user_id: &UserId) -> RepoResult<Vec<Keyed<GoalId, Goal>>>;
    /// Merges the patched fields into the stored goal.
    fn update_goal(&self, user_id: &UserId, goal_id: &GoalId, patch: &GoalPatch)
        -> RepoResult<()>;
    fn delete_goal(&self, user_id: &UserId, goal_id: &GoalId) -> RepoResult<()>;
}

/// Goal repository over any `DocumentStore`.
pub struct StoreGoalRepository<S> {
    store: S,
}

impl<S: DocumentStore> StoreGoalRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: DocumentStore> GoalRepository for StoreGoalRepository<S> {
    fn create_goal(&self, user_id: &UserId, goal: &Goal) -> RepoResult<GoalId> {
        let collection = paths::goals(user_id)?;
        let path = self.store.push(&collection)?;
        self.store.set(&path, &encode(&path, goal)?)?;
        Ok(GoalId::parse(path.key())?)
    }

    fn get_goal(&self, user_id: &UserId, goal_id: &GoalId) -> RepoResult<Option<Goal>> {
        let path = paths::goal(user_id, goal_id)?;
        match self.store.get(&path)? {
            Some(value) => Ok(Some(decode(&path, value)?)),
            None => Ok(None),
        }
    }

    fn list_goals(&self, user_id: &UserId) -> RepoResult<Vec<Keyed<GoalId, Goal>>> {
        let path = paths::goals(user_id)?;
        let snapshot = self.store.get(&path)?;
        decode_collection(&path, snapshot, GoalId::parse)
    }

    fn update_goal(
        &self,
        user_id: &UserId,
        goal_id: &GoalId,
        patch: &GoalPatch,
    ) -> RepoResult<()> {
        let path = paths::goal(user_id, goal_id)?;
        self.store.update(&path, &patch.to_fields())?;
        Ok(())
    }

    fn delete_goal(&self, user_id: &UserId, goal_id: &GoalId) -> RepoResult<()> {
        self.store.remove(&paths::goal(user_id, goal_id)?)?;
        Ok(())
    }
}
