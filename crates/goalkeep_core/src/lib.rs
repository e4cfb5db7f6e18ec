//! Core domain logic for GoalKeep.
//!
//! Goals, tasks, journal entries and the community feed are stored in a
//! hierarchical document store. Repositories map records onto store paths;
//! services on top add validation, ownership and reference policies.

pub mod blob;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
pub mod store;

pub use blob::{BlobError, BlobStore, DirBlobStore};
pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::goal::{Goal, GoalPatch, Milestone};
pub use model::ids::{CommentId, GoalId, JournalEntryId, PostId, TaskId, UserId};
pub use model::journal::{JournalCategory, JournalEntry, JournalPatch};
pub use model::post::{Comment, Post};
pub use model::task::{Task, TaskPatch};
pub use model::user::UserProfile;
pub use model::{EpochMs, Keyed};
pub use repo::{RepoError, RepoResult};
pub use service::dashboard_service::{DashboardService, DashboardSummary};
pub use service::feed_service::FeedService;
pub use service::goal_service::{GoalDeleteOutcome, GoalDeletePolicy, GoalService, NewGoal};
pub use service::journal_service::{ExportedPdf, JournalService};
pub use service::profile_service::ProfileService;
pub use service::task_service::{NewTask, TaskFilter, TaskService};
pub use service::{ServiceError, ServiceResult};
pub use session::{
    global_session, Identity, RouteDecision, Screen, SessionError, SessionProvider,
    SubscriptionId,
};
pub use store::{DocumentStore, SqliteDocumentStore, StoreError, StorePath};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
