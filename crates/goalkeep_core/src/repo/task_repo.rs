//! Task repository contract and store-backed implementation.
//!
//! # Invariants
//! - Tasks live under `users/{userId}/tasks/{taskId}`, not under their goal,
//!   so a goal delete never touches them.

use crate::model::ids::{GoalId, TaskId, UserId};
use crate::model::task::{Task, TaskPatch};
use crate::model::Keyed;
use crate::repo::{decode, decode_collection, encode, paths, RepoResult};
use crate::store::DocumentStore;

/// Repository interface for task CRUD.
pub trait TaskRepository {
    fn create_task(&self, user_id: &UserId, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, user_id: &UserId, task_id: &TaskId) -> RepoResult<Option<Task>>;
    /// Every task of the user, oldest first.
    fn list_tasks(&self, user_id: &UserId) -> RepoResult<Vec<Keyed<TaskId, Task>>>;
    fn update_task(&self, user_id: &UserId, task_id: &TaskId, patch: &TaskPatch)
        -> RepoResult<()>;
    fn delete_task(&self, user_id: &UserId, task_id: &TaskId) -> RepoResult<()>;

    /// Tasks referencing `goal_id`, filtered client-side from the full list.
    fn list_tasks_for_goal(
        &self,
        user_id: &UserId,
        goal_id: &GoalId,
    ) -> RepoResult<Vec<Keyed<TaskId, Task>>> {
        Ok(self
            .list_tasks(user_id)?
            .into_iter()
            .filter(|task| &task.record.goal_id == goal_id)
            .collect())
    }
}

/// Task repository over any `DocumentStore`.
pub struct StoreTaskRepository<S> {
    store: S,
}

impl<S: DocumentStore> StoreTaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: DocumentStore> TaskRepository for StoreTaskRepository<S> {
    fn create_task(&self, user_id: &UserId, task: &Task) -> RepoResult<TaskId> {
        let collection = paths::tasks(user_id)?;
        let path = self.store.push(&collection)?;
        self.store.set(&path, &encode(&path, task)?)?;
        Ok(TaskId::parse(path.key())?)
    }

    fn get_task(&self, user_id: &UserId, task_id: &TaskId) -> RepoResult<Option<Task>> {
        let path = paths::task(user_id, task_id)?;
        match self.store.get(&path)? {
            Some(value) => Ok(Some(decode(&path, value)?)),
            None => Ok(None),
        }
    }

    fn list_tasks(&self, user_id: &UserId) -> RepoResult<Vec<Keyed<TaskId, Task>>> {
        let path = paths::tasks(user_id)?;
        let snapshot = self.store.get(&path)?;
        decode_collection(&path, snapshot, TaskId::parse)
    }

    fn update_task(
        &self,
        user_id: &UserId,
        task_id: &TaskId,
        patch: &TaskPatch,
    ) -> RepoResult<()> {
        let path = paths::task(user_id, task_id)?;
        self.store.update(&path, &patch.to_fields())?;
        Ok(())
    }

    fn delete_task(&self, user_id: &UserId, task_id: &TaskId) -> RepoResult<()> {
        self.store.remove(&paths::task(user_id, task_id)?)?;
        Ok(())
    }
}
