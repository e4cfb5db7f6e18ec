//! Hierarchical store paths.
//!
//! # Invariants
//! - A path has at least one segment.
//! - Segments are non-empty, at most `MAX_SEGMENT_BYTES` long and never
//!   contain `/ . # $ [ ]` or control characters.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_SEGMENT_BYTES: usize = 768;

static SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^/.#$\[\]\x00-\x1F\x7F]+$").expect("valid segment regex"));

/// Rejected path or path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    Empty,
    InvalidSegment(String),
}

impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "store path must have at least one segment"),
            Self::InvalidSegment(segment) => write!(f, "invalid store path segment `{segment}`"),
        }
    }
}

impl Error for PathError {}

/// Returns whether `segment` may be used as one path component or record key.
pub fn is_valid_segment(segment: &str) -> bool {
    segment.len() <= MAX_SEGMENT_BYTES && SEGMENT_RE.is_match(segment)
}

/// Validated `/`-separated location in the document store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// Parses `a/b/c`. Leading and trailing slashes are ignored; empty inner
    /// segments (`a//b`) are rejected.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            segments.push(checked_segment(segment)?);
        }
        Ok(Self { segments })
    }

    /// Builds a path from already separated segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .map(|segment| checked_segment(segment.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self { segments })
    }

    /// Appends exactly one segment.
    pub fn child(&self, segment: &str) -> Result<Self, PathError> {
        let mut segments = self.segments.clone();
        segments.push(checked_segment(segment)?);
        Ok(Self { segments })
    }

    /// Appends a relative path that may span several segments (`a/b`).
    pub fn join(&self, relative: &str) -> Result<Self, PathError> {
        let relative = Self::parse(relative)?;
        let mut segments = self.segments.clone();
        segments.extend(relative.segments);
        Ok(Self { segments })
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while let Some(path) = current {
            current = path.parent();
            out.push(path);
        }
        out
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final segment, i.e. the record key for record paths.
    pub fn key(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.segments.len() > self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Joined textual form used as the storage key.
    pub fn as_key(&self) -> String {
        self.segments.join("/")
    }
}

impl Display for StorePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

fn checked_segment(segment: &str) -> Result<String, PathError> {
    if is_valid_segment(segment) {
        Ok(segment.to_string())
    } else {
        Err(PathError::InvalidSegment(segment.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_segment, PathError, StorePath};

    #[test]
    fn parse_trims_outer_slashes() {
        let path = StorePath::parse("/users/u1/goals/").unwrap();
        assert_eq!(path.as_key(), "users/u1/goals");
        assert_eq!(path.key(), "goals");
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn parse_rejects_empty_and_forbidden_segments() {
        assert_eq!(StorePath::parse("//"), Err(PathError::Empty));
        assert!(matches!(
            StorePath::parse("users//goals"),
            Err(PathError::InvalidSegment(_))
        ));
        for bad in ["a.b", "a#b", "a$b", "a[0]", "tab\there"] {
            assert!(!is_valid_segment(bad), "{bad} should be rejected");
        }
        assert!(is_valid_segment("0190c5e2-7f3a-7c00-8000-000000000000"));
    }

    #[test]
    fn join_and_ancestors_follow_hierarchy() {
        let goal = StorePath::parse("users/u1")
            .unwrap()
            .join("goals/g1")
            .unwrap();
        assert_eq!(goal.as_key(), "users/u1/goals/g1");

        let ancestors = goal
            .ancestors()
            .into_iter()
            .map(|path| path.as_key())
            .collect::<Vec<_>>();
        assert_eq!(ancestors, vec!["users/u1/goals", "users/u1", "users"]);

        let users = StorePath::parse("users").unwrap();
        assert!(users.is_ancestor_of(&goal));
        assert!(!goal.is_ancestor_of(&users));
        assert!(!goal.is_ancestor_of(&goal));
    }
}
