//! Typed record identifiers.
//!
//! Every identifier is a single store path segment. Keys created by the app
//! come from `DocumentStore::push`; user ids come from the identity provider.

use crate::store::path::{is_valid_segment, PathError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Validates `raw` as a single path segment.
            pub fn parse(raw: &str) -> Result<Self, PathError> {
                let trimmed = raw.trim();
                if is_valid_segment(trimmed) {
                    Ok(Self(trimmed.to_string()))
                } else {
                    Err(PathError::InvalidSegment(trimmed.to_string()))
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = PathError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

record_id!(
    /// Identity-provider user id; also the `users/{userId}` key.
    UserId
);
record_id!(GoalId);
record_id!(TaskId);
record_id!(JournalEntryId);
record_id!(PostId);
record_id!(CommentId);
