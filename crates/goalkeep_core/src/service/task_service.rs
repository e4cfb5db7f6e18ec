//! Task use-case service.
//!
//! # Responsibility
//! - Create and edit tasks linked to an existing goal.
//! - Provide the task list view: filtered and ordered by due date.
//! - Surface overdue tasks and tasks whose goal no longer exists.
//!
//! # Invariants
//! - A task can only be created or re-linked to a goal that exists at
//!   write time. Later goal deletes may still leave it dangling.

use crate::model::ids::{GoalId, TaskId, UserId};
use crate::model::task::{Task, TaskPatch};
use crate::model::{now_epoch_ms, Keyed};
use crate::repo::goal_repo::GoalRepository;
use crate::repo::task_repo::TaskRepository;
use crate::service::{normalize_text, normalize_title, ServiceError, ServiceResult};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub goal_id: GoalId,
    pub due_date: Option<NaiveDate>,
}

/// Task list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub goal_id: Option<GoalId>,
    pub include_completed: bool,
}

/// Task service over task and goal repositories.
pub struct TaskService<T: TaskRepository, G: GoalRepository> {
    tasks: T,
    goals: G,
}

impl<T: TaskRepository, G: GoalRepository> TaskService<T, G> {
    pub fn new(tasks: T, goals: G) -> Self {
        Self { tasks, goals }
    }

    pub fn create_task(&self, user_id: &UserId, input: NewTask) -> ServiceResult<TaskId> {
        self.require_goal(user_id, &input.goal_id)?;
        let mut task = Task::new(
            normalize_title("title", &input.title)?,
            input.goal_id,
            now_epoch_ms(),
        );
        task.description = normalize_text("description", &input.description, false)?;
        task.due_date = input.due_date;
        Ok(self.tasks.create_task(user_id, &task)?)
    }

    pub fn get_task(&self, user_id: &UserId, task_id: &TaskId) -> ServiceResult<Option<Task>> {
        Ok(self.tasks.get_task(user_id, task_id)?)
    }

    /// Tasks matching `filter`: open before completed, then by due date
    /// (undated last), then creation order.
    pub fn list_tasks(
        &self,
        user_id: &UserId,
        filter: &TaskFilter,
    ) -> ServiceResult<Vec<Keyed<TaskId, Task>>> {
        let mut tasks = self
            .tasks
            .list_tasks(user_id)?
            .into_iter()
            .filter(|task| {
                filter
                    .goal_id
                    .as_ref()
                    .map_or(true, |goal_id| &task.record.goal_id == goal_id)
            })
            .filter(|task| filter.include_completed || !task.record.completed)
            .collect::<Vec<_>>();
        tasks.sort_by(|left, right| task_order(&left.record, &right.record));
        Ok(tasks)
    }

    pub fn update_task(
        &self,
        user_id: &UserId,
        task_id: &TaskId,
        mut patch: TaskPatch,
    ) -> ServiceResult<Task> {
        self.require_task(user_id, task_id)?;
        if let Some(goal_id) = &patch.goal_id {
            self.require_goal(user_id, goal_id)?;
        }
        if let Some(title) = patch.title.take() {
            patch.title = Some(normalize_title("title", &title)?);
        }
        if let Some(description) = patch.description.take() {
            patch.description = Some(normalize_text("description", &description, false)?);
        }
        if !patch.is_empty() {
            self.tasks.update_task(user_id, task_id, &patch)?;
        }
        self.require_task(user_id, task_id)
    }

    pub fn complete_task(&self, user_id: &UserId, task_id: &TaskId) -> ServiceResult<Task> {
        self.update_task(user_id, task_id, TaskPatch::complete(now_epoch_ms()))
    }

    pub fn reopen_task(&self, user_id: &UserId, task_id: &TaskId) -> ServiceResult<Task> {
        self.update_task(user_id, task_id, TaskPatch::reopen())
    }

    pub fn delete_task(&self, user_id: &UserId, task_id: &TaskId) -> ServiceResult<()> {
        self.require_task(user_id, task_id)?;
        Ok(self.tasks.delete_task(user_id, task_id)?)
    }

    /// Open tasks due before `today`, earliest first.
    pub fn overdue_tasks(
        &self,
        user_id: &UserId,
        today: NaiveDate,
    ) -> ServiceResult<Vec<Keyed<TaskId, Task>>> {
        let mut overdue = self
            .tasks
            .list_tasks(user_id)?
            .into_iter()
            .filter(|task| task.record.is_overdue(today))
            .collect::<Vec<_>>();
        overdue.sort_by(|left, right| task_order(&left.record, &right.record));
        Ok(overdue)
    }

    /// Tasks whose `goalId` no longer resolves to a goal.
    pub fn orphaned_tasks(&self, user_id: &UserId) -> ServiceResult<Vec<Keyed<TaskId, Task>>> {
        let goal_ids = self
            .goals
            .list_goals(user_id)?
            .into_iter()
            .map(|goal| goal.id)
            .collect::<HashSet<_>>();
        Ok(self
            .tasks
            .list_tasks(user_id)?
            .into_iter()
            .filter(|task| !goal_ids.contains(&task.record.goal_id))
            .collect())
    }

    fn require_goal(&self, user_id: &UserId, goal_id: &GoalId) -> ServiceResult<()> {
        match self.goals.get_goal(user_id, goal_id)? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found("goal", goal_id)),
        }
    }

    fn require_task(&self, user_id: &UserId, task_id: &TaskId) -> ServiceResult<Task> {
        self.tasks
            .get_task(user_id, task_id)?
            .ok_or_else(|| ServiceError::not_found("task", task_id))
    }
}

fn task_order(left: &Task, right: &Task) -> Ordering {
    left.completed
        .cmp(&right.completed)
        .then_with(|| match (left.due_date, right.due_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| left.created_at.cmp(&right.created_at))
}
