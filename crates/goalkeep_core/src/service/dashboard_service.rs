//! Dashboard summary computed from whole-collection reads.

use crate::model::ids::{JournalEntryId, UserId};
use crate::model::journal::JournalEntry;
use crate::model::Keyed;
use crate::repo::goal_repo::GoalRepository;
use crate::repo::journal_repo::JournalRepository;
use crate::repo::task_repo::TaskRepository;
use crate::service::ServiceResult;
use chrono::NaiveDate;

/// Counters shown on the dashboard screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_goals: usize,
    pub completed_goals: usize,
    /// Completed goals as a rounded percentage; 0 when there are no goals.
    pub completion_percent: u8,
    pub milestones_done: usize,
    pub milestones_total: usize,
    pub open_tasks: usize,
    pub tasks_due_today: usize,
    pub overdue_tasks: usize,
    pub journal_entries: usize,
    pub latest_entry: Option<Keyed<JournalEntryId, JournalEntry>>,
}

pub struct DashboardService<G: GoalRepository, T: TaskRepository, J: JournalRepository> {
    goals: G,
    tasks: T,
    journal: J,
}

impl<G: GoalRepository, T: TaskRepository, J: JournalRepository> DashboardService<G, T, J> {
    pub fn new(goals: G, tasks: T, journal: J) -> Self {
        Self {
            goals,
            tasks,
            journal,
        }
    }

    pub fn summary(&self, user_id: &UserId, today: NaiveDate) -> ServiceResult<DashboardSummary> {
        let mut summary = DashboardSummary::default();

        for goal in self.goals.list_goals(user_id)? {
            summary.total_goals += 1;
            if goal.record.completed {
                summary.completed_goals += 1;
            }
            let (done, total) = goal.record.milestone_progress();
            summary.milestones_done += done;
            summary.milestones_total += total;
        }
        summary.completion_percent = percent(summary.completed_goals, summary.total_goals);

        for task in self.tasks.list_tasks(user_id)? {
            if task.record.completed {
                continue;
            }
            summary.open_tasks += 1;
            if task.record.is_due_on(today) {
                summary.tasks_due_today += 1;
            }
            if task.record.is_overdue(today) {
                summary.overdue_tasks += 1;
            }
        }

        let entries = self.journal.list_entries(user_id)?;
        summary.journal_entries = entries.len();
        summary.latest_entry = entries.into_iter().max_by(|left, right| {
            left.record
                .created_at
                .cmp(&right.record.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });

        Ok(summary)
    }
}

fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part * 100 + whole / 2) / whole;
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::percent;

    #[test]
    fn percent_rounds_and_handles_empty() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(3, 3), 100);
    }
}
