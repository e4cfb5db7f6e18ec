//! Task record linked to a goal.

use super::ids::GoalId;
use super::EpochMs;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Actionable item; `goal_id` is a plain reference the store does not enforce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub goal_id: GoalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<EpochMs>,
    #[serde(default)]
    pub created_at: EpochMs,
}

impl Task {
    pub fn new(title: impl Into<String>, goal_id: GoalId, created_at: EpochMs) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            goal_id,
            due_date: None,
            completed: false,
            completed_at: None,
            created_at,
        }
    }

    /// Open task whose due date is strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        !self.completed && self.due_date == Some(day)
    }
}

/// Field-level partial update for a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal_id: Option<GoalId>,
    pub due_date: Option<Option<NaiveDate>>,
    pub completed: Option<bool>,
    pub completed_at: Option<Option<EpochMs>>,
}

impl TaskPatch {
    pub fn complete(at: EpochMs) -> Self {
        Self {
            completed: Some(true),
            completed_at: Some(Some(at)),
            ..Self::default()
        }
    }

    pub fn reopen() -> Self {
        Self {
            completed: Some(false),
            completed_at: Some(None),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(title) = &self.title {
            fields.insert("title".into(), Value::from(title.as_str()));
        }
        if let Some(description) = &self.description {
            fields.insert("description".into(), Value::from(description.as_str()));
        }
        if let Some(goal_id) = &self.goal_id {
            fields.insert("goalId".into(), Value::from(goal_id.as_str()));
        }
        if let Some(due_date) = &self.due_date {
            fields.insert(
                "dueDate".into(),
                due_date.map_or(Value::Null, |date| Value::from(date.to_string())),
            );
        }
        if let Some(completed) = self.completed {
            fields.insert("completed".into(), Value::from(completed));
        }
        if let Some(completed_at) = self.completed_at {
            fields.insert(
                "completedAt".into(),
                completed_at.map_or(Value::Null, Value::from),
            );
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::Task;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn overdue_requires_open_task_with_past_due_date() {
        let mut task = Task::new("stretch", "g1".parse().unwrap(), 0);
        assert!(!task.is_overdue(day(10)));

        task.due_date = Some(day(9));
        assert!(task.is_overdue(day(10)));
        assert!(!task.is_overdue(day(9)));
        assert!(task.is_due_on(day(9)));

        task.completed = true;
        assert!(!task.is_overdue(day(10)));
    }

    #[test]
    fn due_date_serializes_as_calendar_day() {
        let mut task = Task::new("t", "g1".parse().unwrap(), 0);
        task.due_date = Some(day(1));
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["dueDate"], "2026-03-01");
        assert_eq!(value["goalId"], "g1");
    }
}
