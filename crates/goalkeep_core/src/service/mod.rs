//! Use-case services behind each screen.
//!
//! # Responsibility
//! - Orchestrate repository calls into screen-level operations.
//! - Own the checks the data-access layer leaves out: input validation,
//!   author ownership and goal/task reference policies.
//!
//! # Invariants
//! - Services stay storage-agnostic; they see repository traits only.
//! - Every list call re-reads the whole collection; nothing is cached.

use crate::blob::BlobError;
use crate::repo::RepoError;
use crate::session::SessionError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod dashboard_service;
pub mod feed_service;
pub mod goal_service;
pub mod journal_service;
pub mod profile_service;
pub mod task_service;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_TEXT_CHARS: usize = 20_000;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by use-case services.
#[derive(Debug)]
pub enum ServiceError {
    /// Caller input rejected before any write.
    Validation(String),
    /// Referenced record does not exist.
    NotFound { kind: &'static str, id: String },
    /// Caller does not own the record.
    Forbidden { action: &'static str },
    /// Operation refused by a reference policy.
    Conflict(String),
    Session(SessionError),
    Blob(BlobError),
    Repo(RepoError),
}

impl ServiceError {
    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Forbidden { action } => write!(f, "not allowed to {action}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Session(err) => write!(f, "{err}"),
            Self::Blob(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Session(err) => Some(err),
            Self::Blob(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SessionError> for ServiceError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<BlobError> for ServiceError {
    fn from(value: BlobError) -> Self {
        Self::Blob(value)
    }
}

/// Trims `value` and rejects blank or over-long titles.
pub(crate) fn normalize_title(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{field} must not be blank")));
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(ServiceError::Validation(format!(
            "{field} exceeds {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims free text; blank is allowed unless `required`.
pub(crate) fn normalize_text(field: &str, value: &str, required: bool) -> ServiceResult<String> {
    let trimmed = value.trim();
    if required && trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{field} must not be blank")));
    }
    if trimmed.chars().count() > MAX_TEXT_CHARS {
        return Err(ServiceError::Validation(format!(
            "{field} exceeds {MAX_TEXT_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}
