//! Goal record and milestone list.
//!
//! # Invariants
//! - `completed_at` is set iff `completed` is true when written through
//!   `Goal::complete`/`Goal::reopen`; raw patches are not checked.
//! - Milestones keep insertion order. The store hands lists back as objects
//!   keyed `"0"`, `"1"`, ...; decoding orders them by numeric index.

use super::EpochMs;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One checklist step inside a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Top-level user objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: EpochMs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    /// Recurring goal that is re-opened every day.
    #[serde(default)]
    pub is_daily_goal: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<EpochMs>,
    #[serde(
        default,
        deserialize_with = "milestone_list::deserialize",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub milestones: Vec<Milestone>,
}

mod milestone_list {
    use super::Milestone;
    use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
    use std::fmt::Formatter;

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Milestone>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MilestoneListVisitor)
    }

    struct MilestoneListVisitor;

    impl<'de> Visitor<'de> for MilestoneListVisitor {
        type Value = Vec<Milestone>;

        fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str("a milestone list or an index-keyed milestone map")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut milestones = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(milestone) = seq.next_element()? {
                milestones.push(milestone);
            }
            Ok(milestones)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut indexed: Vec<(usize, Milestone)> = Vec::new();
            while let Some((key, milestone)) = map.next_entry::<String, Milestone>()? {
                let index = key.parse::<usize>().map_err(|_| {
                    <A::Error as de::Error>::custom(format!(
                        "milestone key `{key}` is not an index"
                    ))
                })?;
                indexed.push((index, milestone));
            }
            indexed.sort_by_key(|(index, _)| *index);
            Ok(indexed.into_iter().map(|(_, milestone)| milestone).collect())
        }
    }
}

impl Goal {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: EpochMs,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            created_at,
            target_date: None,
            is_daily_goal: false,
            completed: false,
            completed_at: None,
            milestones: Vec::new(),
        }
    }

    /// `(done, total)` milestone counts.
    pub fn milestone_progress(&self) -> (usize, usize) {
        let done = self
            .milestones
            .iter()
            .filter(|milestone| milestone.completed)
            .count();
        (done, self.milestones.len())
    }

    /// Whether a daily goal completed at `completed_at` is stale on `today`.
    pub fn needs_daily_reset(&self, today_start: EpochMs) -> bool {
        self.is_daily_goal
            && self.completed
            && self.completed_at.map_or(true, |at| at < today_start)
    }
}

/// Field-level partial update for a goal.
///
/// `None` leaves a field untouched; `Some(None)` on optional fields clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_date: Option<Option<NaiveDate>>,
    pub is_daily_goal: Option<bool>,
    pub completed: Option<bool>,
    pub completed_at: Option<Option<EpochMs>>,
    pub milestones: Option<Vec<Milestone>>,
}

impl GoalPatch {
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

    /// Store `update` fields; cleared optionals map to `null`.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(title) = &self.title {
            fields.insert("title".into(), Value::from(title.as_str()));
        }
        if let Some(description) = &self.description {
            fields.insert("description".into(), Value::from(description.as_str()));
        }
        if let Some(target_date) = &self.target_date {
            fields.insert(
                "targetDate".into(),
                target_date.map_or(Value::Null, |date| Value::from(date.to_string())),
            );
        }
        if let Some(is_daily_goal) = self.is_daily_goal {
            fields.insert("isDailyGoal".into(), Value::from(is_daily_goal));
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
        if let Some(milestones) = &self.milestones {
            fields.insert(
                "milestones".into(),
                Value::Array(
                    milestones
                        .iter()
                        .map(|milestone| {
                            serde_json::json!({
                                "text": milestone.text,
                                "completed": milestone.completed,
                            })
                        })
                        .collect(),
                ),
            );
        }
        fields
    }
}
