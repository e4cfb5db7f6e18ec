//! Goal use-case service.
//!
//! # Responsibility
//! - Create, list, edit, complete and delete goals and their milestones.
//! - Apply an explicit task policy when a goal is deleted.
//!
//! # Invariants
//! - Completion always writes `completed` and `completedAt` together.
//! - Edits check the goal exists first, so an update never creates a
//!   partial goal. The check and the write are not atomic; a partial node
//!   left by a racing delete is hidden from lists and can still be deleted.

use crate::model::goal::{Goal, GoalPatch, Milestone};
use crate::model::ids::{GoalId, UserId};
use crate::model::{now_epoch_ms, EpochMs, Keyed};
use crate::repo::goal_repo::GoalRepository;
use crate::repo::RepoError;
use crate::repo::task_repo::TaskRepository;
use crate::service::{normalize_text, normalize_title, ServiceError, ServiceResult};
use chrono::NaiveDate;
use log::info;

/// What happens to tasks that reference a deleted goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GoalDeletePolicy {
    /// Delete the goal only; tasks keep a dangling `goalId`.
    #[default]
    KeepTasks,
    /// Delete the goal and every task that references it.
    CascadeTasks,
    /// Refuse while any task references the goal.
    Restrict,
}

impl GoalDeletePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeepTasks => "keep_tasks",
            Self::CascadeTasks => "cascade_tasks",
            Self::Restrict => "restrict",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "keep_tasks" => Some(Self::KeepTasks),
            "cascade_tasks" => Some(Self::CascadeTasks),
            "restrict" => Some(Self::Restrict),
            _ => None,
        }
    }
}

/// Input for creating a goal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGoal {
    pub title: String,
    pub description: String,
    pub target_date: Option<NaiveDate>,
    pub is_daily_goal: bool,
    pub milestones: Vec<String>,
}

/// Result of `delete_goal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalDeleteOutcome {
    /// Tasks deleted together with the goal.
    pub removed_tasks: usize,
    /// Tasks left behind referencing the deleted goal.
    pub dangling_tasks: usize,
}

/// Goal service over goal and task repositories.
pub struct GoalService<G: GoalRepository, T: TaskRepository> {
    goals: G,
    tasks: T,
}

impl<G: GoalRepository, T: TaskRepository> GoalService<G, T> {
    pub fn new(goals: G, tasks: T) -> Self {
        Self { goals, tasks }
    }

    /// Validates and stores a new goal; returns the store-assigned id.
    pub fn create_goal(&self, user_id: &UserId, input: NewGoal) -> ServiceResult<GoalId> {
        let mut goal = Goal::new(
            normalize_title("title", &input.title)?,
            normalize_text("description", &input.description, false)?,
            now_epoch_ms(),
        );
        goal.target_date = input.target_date;
        goal.is_daily_goal = input.is_daily_goal;
        for text in input.milestones {
            let text = text.trim();
            if !text.is_empty() {
                goal.milestones.push(Milestone {
                    text: normalize_title("milestone", text)?,
                    completed: false,
                });
            }
        }

        let goal_id = self.goals.create_goal(user_id, &goal)?;
        info!(
            "event=goal_create module=service status=ok milestones={} daily={}",
            goal.milestones.len(),
            goal.is_daily_goal
        );
        Ok(goal_id)
    }

    pub fn get_goal(&self, user_id: &UserId, goal_id: &GoalId) -> ServiceResult<Option<Goal>> {
        Ok(self.goals.get_goal(user_id, goal_id)?)
    }

    /// All goals, oldest first.
    pub fn list_goals(&self, user_id: &UserId) -> ServiceResult<Vec<Keyed<GoalId, Goal>>> {
        Ok(self.goals.list_goals(user_id)?)
    }

    /// Applies `patch` to an existing goal and returns the stored result.
    pub fn update_goal(
        &self,
        user_id: &UserId,
        goal_id: &GoalId,
        mut patch: GoalPatch,
    ) -> ServiceResult<Goal> {
        self.require_goal(user_id, goal_id)?;
        if let Some(title) = patch.title.take() {
            patch.title = Some(normalize_title("title", &title)?);
        }
        if let Some(description) = patch.description.take() {
            patch.description = Some(normalize_text("description", &description, false)?);
        }
        if !patch.is_empty() {
            self.goals.update_goal(user_id, goal_id, &patch)?;
        }
        self.require_goal(user_id, goal_id)
    }

    pub fn complete_goal(&self, user_id: &UserId, goal_id: &GoalId) -> ServiceResult<Goal> {
        self.complete_goal_at(user_id, goal_id, now_epoch_ms())
    }

    pub fn complete_goal_at(
        &self,
        user_id: &UserId,
        goal_id: &GoalId,
        at: EpochMs,
    ) -> ServiceResult<Goal> {
        self.update_goal(user_id, goal_id, GoalPatch::complete(at))
    }

    pub fn reopen_goal(&self, user_id: &UserId, goal_id: &GoalId) -> ServiceResult<Goal> {
        self.update_goal(user_id, goal_id, GoalPatch::reopen())
    }

    /// Appends a milestone (read-modify-write of the milestone list).
    pub fn add_milestone(
        &self,
        user_id: &UserId,
        goal_id: &GoalId,
        text: &str,
    ) -> ServiceResult<Goal> {
        let mut goal = self.require_goal(user_id, goal_id)?;
        goal.milestones.push(Milestone {
            text: normalize_title("milestone", text)?,
            completed: false,
        });
        let patch = GoalPatch {
            milestones: Some(goal.milestones),
            ..GoalPatch::default()
        };
        self.goals.update_goal(user_id, goal_id, &patch)?;
        self.require_goal(user_id, goal_id)
    }

    /// Flips one milestone's `completed` flag.
    pub fn toggle_milestone(
        &self,
        user_id: &UserId,
        goal_id: &GoalId,
        index: usize,
    ) -> ServiceResult<Goal> {
        let mut goal = self.require_goal(user_id, goal_id)?;
        let Some(milestone) = goal.milestones.get_mut(index) else {
            return Err(ServiceError::not_found(
                "milestone",
                format!("{goal_id}#{index}"),
            ));
        };
        milestone.completed = !milestone.completed;
        let patch = GoalPatch {
            milestones: Some(goal.milestones),
            ..GoalPatch::default()
        };
        self.goals.update_goal(user_id, goal_id, &patch)?;
        self.require_goal(user_id, goal_id)
    }

    /// Deletes a goal and applies `policy` to the tasks that reference it.
    pub fn delete_goal(
        &self,
        user_id: &UserId,
        goal_id: &GoalId,
        policy: GoalDeletePolicy,
    ) -> ServiceResult<GoalDeleteOutcome> {
        match self.goals.get_goal(user_id, goal_id) {
            Ok(Some(_)) | Err(RepoError::InvalidData { .. }) => {}
            Ok(None) => return Err(ServiceError::not_found("goal", goal_id)),
            Err(err) => return Err(err.into()),
        }
        let linked = self.tasks.list_tasks_for_goal(user_id, goal_id)?;

        let outcome = match policy {
            GoalDeletePolicy::Restrict if !linked.is_empty() => {
                return Err(ServiceError::Conflict(format!(
                    "goal {goal_id} is referenced by {} task(s)",
                    linked.len()
                )));
            }
            GoalDeletePolicy::CascadeTasks => {
                for task in &linked {
                    self.tasks.delete_task(user_id, &task.id)?;
                }
                GoalDeleteOutcome {
                    removed_tasks: linked.len(),
                    dangling_tasks: 0,
                }
            }
            GoalDeletePolicy::KeepTasks | GoalDeletePolicy::Restrict => GoalDeleteOutcome {
                removed_tasks: 0,
                dangling_tasks: linked.len(),
            },
        };

        self.goals.delete_goal(user_id, goal_id)?;
        info!(
            "event=goal_delete module=service status=ok policy={} removed_tasks={} dangling_tasks={}",
            policy.as_str(),
            outcome.removed_tasks,
            outcome.dangling_tasks
        );
        Ok(outcome)
    }

    /// Re-opens daily goals completed before `today_start`; returns how many.
    pub fn reset_daily_goals(&self, user_id: &UserId, today_start: EpochMs) -> ServiceResult<usize> {
        let mut reopened = 0;
        for goal in self.goals.list_goals(user_id)? {
            if goal.record.needs_daily_reset(today_start) {
                self.goals
                    .update_goal(user_id, &goal.id, &GoalPatch::reopen())?;
                reopened += 1;
            }
        }
        Ok(reopened)
    }

    fn require_goal(&self, user_id: &UserId, goal_id: &GoalId) -> ServiceResult<Goal> {
        self.goals
            .get_goal(user_id, goal_id)?
            .ok_or_else(|| ServiceError::not_found("goal", goal_id))
    }
}
