//! Journal entry record.

use super::EpochMs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// Category tag of a journal entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalCategory {
    #[default]
    General,
    Gratitude,
    Reflection,
    Progress,
    Challenge,
}

impl JournalCategory {
    pub const ALL: [JournalCategory; 5] = [
        Self::General,
        Self::Gratitude,
        Self::Reflection,
        Self::Progress,
        Self::Challenge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Gratitude => "gratitude",
            Self::Reflection => "reflection",
            Self::Progress => "progress",
            Self::Challenge => "challenge",
        }
    }

    /// Case-insensitive parse of the stored name.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
    }

    /// Human-readable label used in exports.
    pub fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Gratitude => "Gratitude",
            Self::Reflection => "Reflection",
            Self::Progress => "Progress",
            Self::Challenge => "Challenge",
        }
    }
}

impl Display for JournalCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text reflective note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: JournalCategory,
    #[serde(default)]
    pub created_at: EpochMs,
}

impl JournalEntry {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: JournalCategory,
        created_at: EpochMs,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category,
            created_at,
        }
    }
}

/// Field-level partial update for a journal entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<JournalCategory>,
}

impl JournalPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(title) = &self.title {
            fields.insert("title".into(), Value::from(title.as_str()));
        }
        if let Some(content) = &self.content {
            fields.insert("content".into(), Value::from(content.as_str()));
        }
        if let Some(category) = self.category {
            fields.insert("category".into(), Value::from(category.as_str()));
        }
        fields
    }
}
