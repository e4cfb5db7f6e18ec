//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose one group of screen-level functions per view (auth, onboarding,
//!   dashboard, goals, tasks, journal, community, account) to Dart via FRB.
//! - Resolve the signed-in identity from the process-wide session provider.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every failure is reported through a response envelope with `ok=false`
//!   and a human-readable `message`.
//! - Each call opens its own connection; no store state outlives a call.

use chrono::NaiveDate;
use goalkeep_core::db::open_db;
use goalkeep_core::repo::goal_repo::StoreGoalRepository;
use goalkeep_core::repo::journal_repo::StoreJournalRepository;
use goalkeep_core::repo::post_repo::StorePostRepository;
use goalkeep_core::repo::task_repo::StoreTaskRepository;
use goalkeep_core::repo::user_repo::{StoreUserRepository, UserRepository};
use goalkeep_core::session::resolve_route;
use goalkeep_core::{
    core_version as core_version_inner, global_session, init_logging as init_logging_inner,
    ping as ping_inner, AppConfig, Comment, CommentId, DashboardService, DirBlobStore,
    FeedService, Goal, GoalDeletePolicy, GoalId, GoalPatch, GoalService, Identity,
    JournalCategory, JournalEntry, JournalEntryId, JournalPatch, JournalService, Keyed, NewGoal,
    NewTask, Post, PostId, ProfileService, RouteDecision, Screen, SqliteDocumentStore,
    SubscriptionId, Task, TaskFilter, TaskId, TaskPatch, TaskService, UserId,
};
use log::{info, warn};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();
static SESSION_WATCHES: Mutex<BTreeMap<u64, SessionWatch>> = Mutex::new(BTreeMap::new());
static NEXT_WATCH_ID: AtomicU64 = AtomicU64::new(1);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the database file and blob directory for this process.
///
/// Must run before the first data call; otherwise the environment
/// (`GOALKEEP_DB_PATH`, `GOALKEEP_BLOB_DIR`) or temp-dir defaults apply.
/// Returns empty string on success; repeating with the same paths is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn init_store(db_path: String, blob_dir: String) -> String {
    let mut requested = AppConfig::from_env();
    if !db_path.trim().is_empty() {
        requested.db_path = db_path.trim().into();
    }
    if !blob_dir.trim().is_empty() {
        requested.blob_dir = blob_dir.trim().into();
    }

    let active = APP_CONFIG.get_or_init(|| requested.clone());
    store_conflict(active, &requested).unwrap_or_default()
}

/// Describes every path that differs from the already pinned store config.
fn store_conflict(active: &AppConfig, requested: &AppConfig) -> Option<String> {
    let mut conflicts = Vec::new();
    if active.db_path != requested.db_path {
        conflicts.push(format!(
            "db_path is `{}`, not `{}`",
            active.db_path.display(),
            requested.db_path.display()
        ));
    }
    if active.blob_dir != requested.blob_dir {
        conflicts.push(format!(
            "blob_dir is `{}`, not `{}`",
            active.blob_dir.display(),
            requested.blob_dir.display()
        ));
    }
    if conflicts.is_empty() {
        None
    } else {
        Some(format!("store already initialized: {}", conflicts.join("; ")))
    }
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Created/affected record id or produced URL, when there is one.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }

    fn from_result(op: &str, message: &str, result: Result<Option<String>, String>) -> Self {
        match result {
            Ok(id) => Self::success(message, id),
            Err(err) => Self::failure(failure_message(op, err)),
        }
    }
}

/// Navigation decision for a requested screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteResponse {
    /// Screen to show (`auth|onboarding|dashboard|goals|tasks|journal|community|account`).
    pub screen: String,
    pub redirected: bool,
    pub message: String,
}

/// Records the identity reported by the sign-in flow and notifies listeners.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_in(
    user_id: String,
    email: String,
    display_name: Option<String>,
    photo_url: Option<String>,
) -> ActionResponse {
    let user_id = match UserId::parse(&user_id) {
        Ok(user_id) => user_id,
        Err(err) => return ActionResponse::failure(failure_message("auth_sign_in", err)),
    };
    let id = user_id.to_string();
    global_session().sign_in(Identity {
        user_id,
        email: email.trim().to_string(),
        display_name: display_name.filter(|name| !name.trim().is_empty()),
        photo_url: photo_url.filter(|url| !url.trim().is_empty()),
    });
    ActionResponse::success("Signed in.", Some(id))
}

#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_out() -> ActionResponse {
    global_session().sign_out();
    ActionResponse::success("Signed out.", None)
}

/// Resolves which screen may be shown for a navigation request.
///
/// Unknown screen names resolve as `dashboard`. A profile lookup failure is
/// treated as "not onboarded" and reported in `message`.
#[flutter_rust_bridge::frb(sync)]
pub fn session_route(screen: String) -> RouteResponse {
    let requested = Screen::parse(&screen).unwrap_or(Screen::Dashboard);
    let identity = global_session().current();
    let (onboarded, message) = match &identity {
        None => (false, String::new()),
        Some(identity) => match with_store(|store| {
            StoreUserRepository::new(store)
                .get_profile(&identity.user_id)
                .map_err(|err| err.to_string())
        }) {
            Ok(profile) => (profile.map_or(false, |profile| profile.onboarded), String::new()),
            Err(err) => (false, failure_message("session_route", err)),
        },
    };

    let decision = resolve_route(requested, identity.as_ref(), onboarded);
    RouteResponse {
        screen: decision.target().as_str().to_string(),
        redirected: matches!(decision, RouteDecision::Redirect(_)),
        message,
    }
}

/// Identity snapshot delivered to a session watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEventItem {
    pub signed_in: bool,
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEventsResponse {
    pub ok: bool,
    pub events: Vec<SessionEventItem>,
    pub message: String,
}

struct SessionWatch {
    subscription: SubscriptionId,
    pending: Arc<Mutex<Vec<SessionEventItem>>>,
}

/// Starts watching session changes and returns the watch handle.
///
/// The current state is queued immediately; every sign-in, sign-out and
/// profile update queues one more event until `session_unwatch`.
#[flutter_rust_bridge::frb(sync)]
pub fn session_watch() -> u64 {
    let pending = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&pending);
    let subscription = global_session().subscribe(move |identity| {
        lock_ignoring_poison(&sink).push(to_session_event(identity));
    });
    let watch_id = NEXT_WATCH_ID.fetch_add(1, Ordering::Relaxed);
    lock_ignoring_poison(&SESSION_WATCHES).insert(
        watch_id,
        SessionWatch {
            subscription,
            pending,
        },
    );
    info!("event=session_watch module=ffi status=ok watch_id={watch_id}");
    watch_id
}

/// Drains the events queued for `watch_id`, oldest first.
#[flutter_rust_bridge::frb(sync)]
pub fn session_poll(watch_id: u64) -> SessionEventsResponse {
    let pending = lock_ignoring_poison(&SESSION_WATCHES)
        .get(&watch_id)
        .map(|watch| Arc::clone(&watch.pending));
    match pending {
        Some(pending) => {
            let events = std::mem::take(&mut *lock_ignoring_poison(&pending));
            SessionEventsResponse {
                ok: true,
                message: format!("{} event(s).", events.len()),
                events,
            }
        }
        None => SessionEventsResponse {
            ok: false,
            events: Vec::new(),
            message: failure_message("session_poll", format!("unknown watch {watch_id}")),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_unwatch(watch_id: u64) -> ActionResponse {
    let removed = lock_ignoring_poison(&SESSION_WATCHES).remove(&watch_id);
    match removed {
        Some(watch) => {
            global_session().unsubscribe(watch.subscription);
            ActionResponse::success("Stopped watching session.", Some(watch_id.to_string()))
        }
        None => ActionResponse::failure(failure_message(
            "session_unwatch",
            format!("unknown watch {watch_id}"),
        )),
    }
}

/// Profile view for the account screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub ok: bool,
    /// `false` when the signed-in user has no profile record yet.
    pub exists: bool,
    pub username: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub onboarded: bool,
    pub message: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn onboarding_complete(username: String) -> ActionResponse {
    let result = with_store(|store| {
        profile_service(store)
            .complete_onboarding(&username)
            .map(|profile| Some(profile.username))
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("onboarding_complete", "Welcome aboard.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn account_profile() -> ProfileResponse {
    let result = with_store(|store| {
        profile_service(store)
            .get_profile()
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(Some(profile)) => ProfileResponse {
            ok: true,
            exists: true,
            username: profile.username,
            email: profile.email,
            photo_url: profile.photo_url,
            onboarded: profile.onboarded,
            message: String::new(),
        },
        Ok(None) => ProfileResponse {
            ok: true,
            exists: false,
            username: String::new(),
            email: String::new(),
            photo_url: None,
            onboarded: false,
            message: "No profile yet.".to_string(),
        },
        Err(err) => ProfileResponse {
            ok: false,
            exists: false,
            username: String::new(),
            email: String::new(),
            photo_url: None,
            onboarded: false,
            message: failure_message("account_profile", err),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn account_update_username(username: String) -> ActionResponse {
    let result = with_store(|store| {
        profile_service(store)
            .update_username(&username)
            .map(|profile| Some(profile.username))
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("account_update_username", "Username updated.", result)
}

/// Uploads a profile photo; `id` carries the stored URL.
#[flutter_rust_bridge::frb(sync)]
pub fn account_upload_photo(bytes: Vec<u8>, content_type: String) -> ActionResponse {
    let result = with_store(|store| {
        profile_service(store)
            .upload_photo(&bytes, &content_type)
            .map(Some)
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("account_upload_photo", "Photo updated.", result)
}

/// Deletes the signed-in user's data and signs out.
#[flutter_rust_bridge::frb(sync)]
pub fn account_delete() -> ActionResponse {
    let result = with_store(|store| {
        profile_service(store)
            .delete_account()
            .map(|()| None)
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("account_delete", "Account deleted.", result)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardResponse {
    pub ok: bool,
    pub total_goals: u32,
    pub completed_goals: u32,
    pub completion_percent: u32,
    pub milestones_done: u32,
    pub milestones_total: u32,
    pub open_tasks: u32,
    pub tasks_due_today: u32,
    pub overdue_tasks: u32,
    pub journal_entries: u32,
    pub latest_entry_title: Option<String>,
    pub message: String,
}

/// Dashboard counters; `today` is the device's local date (`YYYY-MM-DD`).
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_summary(today: String) -> DashboardResponse {
    let result = parse_date("today", &today).and_then(|today| {
        let identity = signed_in()?;
        with_store(|store| {
            DashboardService::new(
                StoreGoalRepository::new(store),
                StoreTaskRepository::new(store),
                StoreJournalRepository::new(store),
            )
            .summary(&identity.user_id, today)
            .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok(summary) => DashboardResponse {
            ok: true,
            total_goals: count(summary.total_goals),
            completed_goals: count(summary.completed_goals),
            completion_percent: u32::from(summary.completion_percent),
            milestones_done: count(summary.milestones_done),
            milestones_total: count(summary.milestones_total),
            open_tasks: count(summary.open_tasks),
            tasks_due_today: count(summary.tasks_due_today),
            overdue_tasks: count(summary.overdue_tasks),
            journal_entries: count(summary.journal_entries),
            latest_entry_title: summary.latest_entry.map(|entry| entry.record.title),
            message: String::new(),
        },
        Err(err) => DashboardResponse {
            message: failure_message("dashboard_summary", err),
            ..DashboardResponse::default()
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneItem {
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalItem {
    pub goal_id: String,
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`.
    pub target_date: Option<String>,
    pub is_daily_goal: bool,
    pub completed: bool,
    pub completed_at_ms: Option<i64>,
    pub created_at_ms: i64,
    pub milestones: Vec<MilestoneItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalListResponse {
    pub ok: bool,
    pub items: Vec<GoalItem>,
    pub message: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn goals_list() -> GoalListResponse {
    let result = signed_in().and_then(|identity| {
        with_store(|store| {
            goal_service(store)
                .list_goals(&identity.user_id)
                .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok(goals) => GoalListResponse {
            ok: true,
            message: format!("{} goal(s).", goals.len()),
            items: goals.into_iter().map(to_goal_item).collect(),
        },
        Err(err) => GoalListResponse {
            ok: false,
            items: Vec::new(),
            message: failure_message("goals_list", err),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn goals_create(
    title: String,
    description: String,
    target_date: Option<String>,
    is_daily_goal: bool,
    milestones: Vec<String>,
) -> ActionResponse {
    let result = (|| {
        let target_date = parse_optional_date("target_date", target_date.as_deref())?;
        let identity = signed_in()?;
        with_store(|store| {
            goal_service(store)
                .create_goal(
                    &identity.user_id,
                    NewGoal {
                        title,
                        description,
                        target_date,
                        is_daily_goal,
                        milestones,
                    },
                )
                .map(|goal_id| Some(goal_id.to_string()))
                .map_err(|err| err.to_string())
        })
    })();
    ActionResponse::from_result("goals_create", "Goal created.", result)
}

/// Marks a goal complete (`completed=true`) or re-opens it.
#[flutter_rust_bridge::frb(sync)]
pub fn goals_set_completed(goal_id: String, completed: bool) -> ActionResponse {
    let result = with_goal(&goal_id, |service, user_id, goal_id| {
        let updated = if completed {
            service.complete_goal(user_id, goal_id)
        } else {
            service.reopen_goal(user_id, goal_id)
        };
        updated
            .map(|_| Some(goal_id.to_string()))
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("goals_set_completed", "Goal updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn goals_add_milestone(goal_id: String, text: String) -> ActionResponse {
    let result = with_goal(&goal_id, |service, user_id, goal_id| {
        service
            .add_milestone(user_id, goal_id, &text)
            .map(|_| Some(goal_id.to_string()))
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("goals_add_milestone", "Milestone added.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn goals_toggle_milestone(goal_id: String, index: u32) -> ActionResponse {
    let result = with_goal(&goal_id, |service, user_id, goal_id| {
        service
            .toggle_milestone(user_id, goal_id, index as usize)
            .map(|_| Some(goal_id.to_string()))
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("goals_toggle_milestone", "Milestone updated.", result)
}

/// Edits goal fields. `None` leaves a field unchanged; an empty
/// `target_date` clears it.
#[flutter_rust_bridge::frb(sync)]
pub fn goals_update(
    goal_id: String,
    title: Option<String>,
    description: Option<String>,
    target_date: Option<String>,
    is_daily_goal: Option<bool>,
) -> ActionResponse {
    let result = parse_date_patch("target_date", target_date).and_then(|target_date| {
        let patch = GoalPatch {
            title,
            description,
            target_date,
            is_daily_goal,
            ..GoalPatch::default()
        };
        with_goal(&goal_id, |service, user_id, goal_id| {
            service
                .update_goal(user_id, goal_id, patch)
                .map(|_| Some(goal_id.to_string()))
                .map_err(|err| err.to_string())
        })
    });
    ActionResponse::from_result("goals_update", "Goal updated.", result)
}

/// Re-opens daily goals completed before `today_start_ms` (local midnight,
/// chosen by the app).
#[flutter_rust_bridge::frb(sync)]
pub fn goals_reset_daily(today_start_ms: i64) -> ActionResponse {
    let result = signed_in().and_then(|identity| {
        with_store(|store| {
            goal_service(store)
                .reset_daily_goals(&identity.user_id, today_start_ms)
                .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok(reopened) => {
            ActionResponse::success(format!("Reopened {reopened} daily goal(s)."), None)
        }
        Err(err) => ActionResponse::failure(failure_message("goals_reset_daily", err)),
    }
}

/// Deletes a goal. `policy`: `keep_tasks` (default), `cascade_tasks` or `restrict`.
#[flutter_rust_bridge::frb(sync)]
pub fn goals_delete(goal_id: String, policy: Option<String>) -> ActionResponse {
    let policy = match policy.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
        None => GoalDeletePolicy::default(),
        Some(raw) => match GoalDeletePolicy::parse(raw) {
            Some(policy) => policy,
            None => {
                return ActionResponse::failure(failure_message(
                    "goals_delete",
                    format!("unknown delete policy `{raw}`"),
                ))
            }
        },
    };
    let mut message = String::from("Goal deleted.");
    let result = with_goal(&goal_id, |service, user_id, goal_id| {
        let outcome = service
            .delete_goal(user_id, goal_id, policy)
            .map_err(|err| err.to_string())?;
        if outcome.removed_tasks > 0 {
            message = format!("Goal and {} task(s) deleted.", outcome.removed_tasks);
        } else if outcome.dangling_tasks > 0 {
            message = format!(
                "Goal deleted; {} task(s) still reference it.",
                outcome.dangling_tasks
            );
        }
        Ok(Some(goal_id.to_string()))
    });
    ActionResponse::from_result("goals_delete", &message, result)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub goal_id: String,
    /// `YYYY-MM-DD`.
    pub due_date: Option<String>,
    pub completed: bool,
    pub completed_at_ms: Option<i64>,
    pub created_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<TaskItem>,
    pub message: String,
}

/// Task list, optionally limited to one goal.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list(goal_id: Option<String>, include_completed: bool) -> TaskListResponse {
    let result = (|| {
        let goal_id = goal_id
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| GoalId::parse(raw).map_err(|err| err.to_string()))
            .transpose()?;
        let identity = signed_in()?;
        with_store(|store| {
            task_service(store)
                .list_tasks(
                    &identity.user_id,
                    &TaskFilter {
                        goal_id,
                        include_completed,
                    },
                )
                .map_err(|err| err.to_string())
        })
    })();
    to_task_list_response("tasks_list", result)
}

/// Open tasks due before `today` (`YYYY-MM-DD`), earliest first.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_overdue(today: String) -> TaskListResponse {
    let result = parse_date("today", &today).and_then(|today| {
        let identity = signed_in()?;
        with_store(|store| {
            task_service(store)
                .overdue_tasks(&identity.user_id, today)
                .map_err(|err| err.to_string())
        })
    });
    to_task_list_response("tasks_overdue", result)
}

/// Tasks whose goal no longer exists.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_orphaned() -> TaskListResponse {
    let result = signed_in().and_then(|identity| {
        with_store(|store| {
            task_service(store)
                .orphaned_tasks(&identity.user_id)
                .map_err(|err| err.to_string())
        })
    });
    to_task_list_response("tasks_orphaned", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_create(
    title: String,
    description: String,
    goal_id: String,
    due_date: Option<String>,
) -> ActionResponse {
    let result = (|| {
        let goal_id = GoalId::parse(&goal_id).map_err(|err| err.to_string())?;
        let due_date = parse_optional_date("due_date", due_date.as_deref())?;
        let identity = signed_in()?;
        with_store(|store| {
            task_service(store)
                .create_task(
                    &identity.user_id,
                    NewTask {
                        title,
                        description,
                        goal_id,
                        due_date,
                    },
                )
                .map(|task_id| Some(task_id.to_string()))
                .map_err(|err| err.to_string())
        })
    })();
    ActionResponse::from_result("tasks_create", "Task created.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_set_completed(task_id: String, completed: bool) -> ActionResponse {
    let result = with_task(&task_id, |service, user_id, task_id| {
        let updated = if completed {
            service.complete_task(user_id, task_id)
        } else {
            service.reopen_task(user_id, task_id)
        };
        updated
            .map(|_| Some(task_id.to_string()))
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("tasks_set_completed", "Task updated.", result)
}

/// Edits task fields. `None` leaves a field unchanged; an empty `due_date`
/// clears it. A new `goal_id` must name an existing goal.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_update(
    task_id: String,
    title: Option<String>,
    description: Option<String>,
    goal_id: Option<String>,
    due_date: Option<String>,
) -> ActionResponse {
    let result = (|| {
        let goal_id = goal_id
            .as_deref()
            .map(|raw| GoalId::parse(raw).map_err(|err| err.to_string()))
            .transpose()?;
        let patch = TaskPatch {
            title,
            description,
            goal_id,
            due_date: parse_date_patch("due_date", due_date)?,
            ..TaskPatch::default()
        };
        with_task(&task_id, |service, user_id, task_id| {
            service
                .update_task(user_id, task_id, patch)
                .map(|_| Some(task_id.to_string()))
                .map_err(|err| err.to_string())
        })
    })();
    ActionResponse::from_result("tasks_update", "Task updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_delete(task_id: String) -> ActionResponse {
    let result = with_task(&task_id, |service, user_id, task_id| {
        service
            .delete_task(user_id, task_id)
            .map(|()| Some(task_id.to_string()))
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("tasks_delete", "Task deleted.", result)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalItem {
    pub entry_id: String,
    pub title: String,
    pub content: String,
    /// `general|gratitude|reflection|progress|challenge`.
    pub category: String,
    pub category_label: String,
    pub created_at_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalListResponse {
    pub ok: bool,
    pub items: Vec<JournalItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntryResponse {
    pub ok: bool,
    /// `None` when the entry does not exist.
    pub item: Option<JournalItem>,
    pub message: String,
}

/// Exported PDF payload; the app saves `bytes` under `file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalExportResponse {
    pub ok: bool,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub message: String,
}

/// Entries newest first; `category` limits the list when given.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_list(category: Option<String>) -> JournalListResponse {
    let result = (|| {
        let category = category
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(parse_category)
            .transpose()?;
        let identity = signed_in()?;
        with_store(|store| {
            JournalService::new(StoreJournalRepository::new(store))
                .list_entries(&identity.user_id, category)
                .map_err(|err| err.to_string())
        })
    })();
    match result {
        Ok(entries) => JournalListResponse {
            ok: true,
            message: format!("{} entr(ies).", entries.len()),
            items: entries.into_iter().map(to_journal_item).collect(),
        },
        Err(err) => JournalListResponse {
            ok: false,
            items: Vec::new(),
            message: failure_message("journal_list", err),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn journal_create(title: String, content: String, category: String) -> ActionResponse {
    let result = (|| {
        let category = if category.trim().is_empty() {
            JournalCategory::default()
        } else {
            parse_category(&category)?
        };
        let identity = signed_in()?;
        with_store(|store| {
            JournalService::new(StoreJournalRepository::new(store))
                .create_entry(&identity.user_id, &title, &content, category)
                .map(|entry_id| Some(entry_id.to_string()))
                .map_err(|err| err.to_string())
        })
    })();
    ActionResponse::from_result("journal_create", "Entry saved.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn journal_get(entry_id: String) -> JournalEntryResponse {
    let result = (|| {
        let entry_id = JournalEntryId::parse(&entry_id).map_err(|err| err.to_string())?;
        let identity = signed_in()?;
        with_store(|store| {
            JournalService::new(StoreJournalRepository::new(store))
                .get_entry(&identity.user_id, &entry_id)
                .map(|entry| entry.map(|record| to_journal_item(Keyed { id: entry_id, record })))
                .map_err(|err| err.to_string())
        })
    })();
    match result {
        Ok(Some(item)) => JournalEntryResponse {
            ok: true,
            item: Some(item),
            message: String::new(),
        },
        Ok(None) => JournalEntryResponse {
            ok: true,
            item: None,
            message: "Entry not found.".to_string(),
        },
        Err(err) => JournalEntryResponse {
            ok: false,
            item: None,
            message: failure_message("journal_get", err),
        },
    }
}

/// Edits an entry. `None` leaves a field unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_update(
    entry_id: String,
    title: Option<String>,
    content: Option<String>,
    category: Option<String>,
) -> ActionResponse {
    let result = (|| {
        let entry_id = JournalEntryId::parse(&entry_id).map_err(|err| err.to_string())?;
        let patch = JournalPatch {
            title,
            content,
            category: category.as_deref().map(parse_category).transpose()?,
        };
        let identity = signed_in()?;
        with_store(|store| {
            JournalService::new(StoreJournalRepository::new(store))
                .update_entry(&identity.user_id, &entry_id, patch)
                .map(|_| Some(entry_id.to_string()))
                .map_err(|err| err.to_string())
        })
    })();
    ActionResponse::from_result("journal_update", "Entry updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn journal_delete(entry_id: String) -> ActionResponse {
    let result = (|| {
        let entry_id = JournalEntryId::parse(&entry_id).map_err(|err| err.to_string())?;
        let identity = signed_in()?;
        with_store(|store| {
            JournalService::new(StoreJournalRepository::new(store))
                .delete_entry(&identity.user_id, &entry_id)
                .map(|()| Some(entry_id.to_string()))
                .map_err(|err| err.to_string())
        })
    })();
    ActionResponse::from_result("journal_delete", "Entry deleted.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn journal_export_pdf(entry_id: String) -> JournalExportResponse {
    let result = (|| {
        let entry_id = JournalEntryId::parse(&entry_id).map_err(|err| err.to_string())?;
        let identity = signed_in()?;
        with_store(|store| {
            JournalService::new(StoreJournalRepository::new(store))
                .export_entry_pdf(&identity.user_id, &entry_id)
                .map_err(|err| err.to_string())
        })
    })();
    match result {
        Ok(exported) => JournalExportResponse {
            ok: true,
            file_name: exported.file_name,
            bytes: exported.bytes,
            message: "Entry exported.".to_string(),
        },
        Err(err) => JournalExportResponse {
            ok: false,
            file_name: String::new(),
            bytes: Vec::new(),
            message: failure_message("journal_export_pdf", err),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostItem {
    pub post_id: String,
    pub author_name: String,
    pub author_photo_url: Option<String>,
    pub content: String,
    pub created_at_ms: i64,
    pub edited: bool,
    pub encouragement_count: u32,
    pub encouraged_by_me: bool,
    pub comment_count: u32,
    pub is_mine: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    pub ok: bool,
    pub items: Vec<PostItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentItem {
    pub comment_id: String,
    pub author_name: String,
    pub content: String,
    pub created_at_ms: i64,
    pub is_mine: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentListResponse {
    pub ok: bool,
    pub items: Vec<CommentItem>,
    pub message: String,
}

/// Whole feed, newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn feed_list() -> FeedResponse {
    let result = signed_in().and_then(|identity| {
        with_store(|store| {
            feed_service(store)
                .list_feed()
                .map_err(|err| err.to_string())
        })
        .map(|posts| {
            posts
                .into_iter()
                .map(|post| to_post_item(post, &identity.user_id))
                .collect::<Vec<_>>()
        })
    });
    match result {
        Ok(items) => FeedResponse {
            ok: true,
            message: format!("{} post(s).", items.len()),
            items,
        },
        Err(err) => FeedResponse {
            ok: false,
            items: Vec::new(),
            message: failure_message("feed_list", err),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn feed_create_post(content: String) -> ActionResponse {
    let result = signed_in().and_then(|identity| {
        with_store(|store| {
            feed_service(store)
                .create_post(&identity, &content)
                .map(|post_id| Some(post_id.to_string()))
                .map_err(|err| err.to_string())
        })
    });
    ActionResponse::from_result("feed_create_post", "Posted.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn feed_edit_post(post_id: String, content: String) -> ActionResponse {
    let result = with_post(&post_id, |service, identity, post_id| {
        service
            .edit_post(identity, post_id, &content)
            .map(|_| Some(post_id.to_string()))
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("feed_edit_post", "Post updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn feed_delete_post(post_id: String) -> ActionResponse {
    let result = with_post(&post_id, |service, identity, post_id| {
        service
            .delete_post(identity, post_id)
            .map(|()| Some(post_id.to_string()))
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("feed_delete_post", "Post deleted.", result)
}

/// Toggles the caller's encouragement; `message` is `encouraged` or `cleared`.
#[flutter_rust_bridge::frb(sync)]
pub fn feed_toggle_encouragement(post_id: String) -> ActionResponse {
    let result = with_post(&post_id, |service, identity, post_id| {
        service
            .toggle_encouragement(identity, post_id)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(true) => ActionResponse::success("encouraged", Some(post_id)),
        Ok(false) => ActionResponse::success("cleared", Some(post_id)),
        Err(err) => ActionResponse::failure(failure_message("feed_toggle_encouragement", err)),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn feed_add_comment(post_id: String, content: String) -> ActionResponse {
    let result = with_post(&post_id, |service, identity, post_id| {
        service
            .add_comment(identity, post_id, &content)
            .map(|comment_id| Some(comment_id.to_string()))
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("feed_add_comment", "Comment added.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn feed_list_comments(post_id: String) -> CommentListResponse {
    let result = with_post(&post_id, |service, identity, post_id| {
        service
            .list_comments(post_id)
            .map(|comments| {
                comments
                    .into_iter()
                    .map(|comment| to_comment_item(comment, &identity.user_id))
                    .collect::<Vec<_>>()
            })
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(items) => CommentListResponse {
            ok: true,
            message: format!("{} comment(s).", items.len()),
            items,
        },
        Err(err) => CommentListResponse {
            ok: false,
            items: Vec::new(),
            message: failure_message("feed_list_comments", err),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn feed_delete_comment(post_id: String, comment_id: String) -> ActionResponse {
    let result = with_post(&post_id, |service, identity, post_id| {
        let comment_id = CommentId::parse(&comment_id).map_err(|err| err.to_string())?;
        service
            .delete_comment(identity, post_id, &comment_id)
            .map(|()| Some(comment_id.to_string()))
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("feed_delete_comment", "Comment deleted.", result)
}

type StoreRef<'a, 'conn> = &'a SqliteDocumentStore<'conn>;
type GoalSvc<'a, 'conn> =
    GoalService<StoreGoalRepository<StoreRef<'a, 'conn>>, StoreTaskRepository<StoreRef<'a, 'conn>>>;
type TaskSvc<'a, 'conn> =
    TaskService<StoreTaskRepository<StoreRef<'a, 'conn>>, StoreGoalRepository<StoreRef<'a, 'conn>>>;
type FeedSvc<'a, 'conn> = FeedService<StorePostRepository<StoreRef<'a, 'conn>>>;
type ProfileSvc<'a, 'conn> =
    ProfileService<'static, StoreUserRepository<StoreRef<'a, 'conn>>, DirBlobStore>;

fn app_config() -> &'static AppConfig {
    APP_CONFIG.get_or_init(AppConfig::from_env)
}

fn with_store<T>(
    f: impl FnOnce(&SqliteDocumentStore<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let conn =
        open_db(&app_config().db_path).map_err(|err| format!("store open failed: {err}"))?;
    let store = SqliteDocumentStore::new(&conn);
    f(&store)
}

fn signed_in() -> Result<Identity, String> {
    global_session()
        .require_identity()
        .map_err(|err| err.to_string())
}

fn goal_service<'a, 'conn>(store: StoreRef<'a, 'conn>) -> GoalSvc<'a, 'conn> {
    GoalService::new(
        StoreGoalRepository::new(store),
        StoreTaskRepository::new(store),
    )
}

fn task_service<'a, 'conn>(store: StoreRef<'a, 'conn>) -> TaskSvc<'a, 'conn> {
    TaskService::new(
        StoreTaskRepository::new(store),
        StoreGoalRepository::new(store),
    )
}

fn feed_service<'a, 'conn>(store: StoreRef<'a, 'conn>) -> FeedSvc<'a, 'conn> {
    FeedService::new(StorePostRepository::new(store))
}

fn profile_service<'a, 'conn>(store: StoreRef<'a, 'conn>) -> ProfileSvc<'a, 'conn> {
    ProfileService::new(
        StoreUserRepository::new(store),
        DirBlobStore::new(app_config().blob_dir.clone()),
        global_session(),
    )
}

fn with_goal<T>(
    goal_id: &str,
    f: impl FnOnce(&GoalSvc<'_, '_>, &UserId, &GoalId) -> Result<T, String>,
) -> Result<T, String> {
    let goal_id = GoalId::parse(goal_id).map_err(|err| err.to_string())?;
    let identity = signed_in()?;
    with_store(|store| f(&goal_service(store), &identity.user_id, &goal_id))
}

fn with_task<T>(
    task_id: &str,
    f: impl FnOnce(&TaskSvc<'_, '_>, &UserId, &TaskId) -> Result<T, String>,
) -> Result<T, String> {
    let task_id = TaskId::parse(task_id).map_err(|err| err.to_string())?;
    let identity = signed_in()?;
    with_store(|store| f(&task_service(store), &identity.user_id, &task_id))
}

fn with_post<T>(
    post_id: &str,
    f: impl FnOnce(&FeedSvc<'_, '_>, &Identity, &PostId) -> Result<T, String>,
) -> Result<T, String> {
    let post_id = PostId::parse(post_id).map_err(|err| err.to_string())?;
    let identity = signed_in()?;
    with_store(|store| f(&feed_service(store), &identity, &post_id))
}

fn failure_message(op: &str, err: impl std::fmt::Display) -> String {
    warn!("event=ffi_call module=ffi op={} status=error", op);
    format!("{op} failed: {err}")
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("{field} must be YYYY-MM-DD: {err}"))
}

fn parse_optional_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| parse_date(field, value))
        .transpose()
}

/// `None` keeps the stored date, a blank string clears it.
fn parse_date_patch(
    field: &str,
    raw: Option<String>,
) -> Result<Option<Option<NaiveDate>>, String> {
    raw.map(|value| parse_optional_date(field, Some(&value)))
        .transpose()
}

fn parse_category(raw: &str) -> Result<JournalCategory, String> {
    JournalCategory::parse(raw).ok_or_else(|| format!("unknown journal category `{}`", raw.trim()))
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn to_session_event(identity: Option<&Identity>) -> SessionEventItem {
    SessionEventItem {
        signed_in: identity.is_some(),
        user_id: identity.map(|identity| identity.user_id.to_string()),
        display_name: identity.and_then(|identity| identity.display_name.clone()),
        photo_url: identity.and_then(|identity| identity.photo_url.clone()),
    }
}

fn to_task_list_response(
    op: &str,
    result: Result<Vec<Keyed<TaskId, Task>>, String>,
) -> TaskListResponse {
    match result {
        Ok(tasks) => TaskListResponse {
            ok: true,
            message: format!("{} task(s).", tasks.len()),
            items: tasks.into_iter().map(to_task_item).collect(),
        },
        Err(err) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            message: failure_message(op, err),
        },
    }
}

fn count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_goal_item(goal: Keyed<GoalId, Goal>) -> GoalItem {
    let Keyed { id, record } = goal;
    GoalItem {
        goal_id: id.to_string(),
        title: record.title,
        description: record.description,
        target_date: record.target_date.map(|date| date.to_string()),
        is_daily_goal: record.is_daily_goal,
        completed: record.completed,
        completed_at_ms: record.completed_at,
        created_at_ms: record.created_at,
        milestones: record
            .milestones
            .into_iter()
            .map(|milestone| MilestoneItem {
                text: milestone.text,
                completed: milestone.completed,
            })
            .collect(),
    }
}

fn to_task_item(task: Keyed<TaskId, Task>) -> TaskItem {
    let Keyed { id, record } = task;
    TaskItem {
        task_id: id.to_string(),
        title: record.title,
        description: record.description,
        goal_id: record.goal_id.to_string(),
        due_date: record.due_date.map(|date| date.to_string()),
        completed: record.completed,
        completed_at_ms: record.completed_at,
        created_at_ms: record.created_at,
    }
}

fn to_journal_item(entry: Keyed<JournalEntryId, JournalEntry>) -> JournalItem {
    let Keyed { id, record } = entry;
    JournalItem {
        entry_id: id.to_string(),
        title: record.title,
        content: record.content,
        category: record.category.as_str().to_string(),
        category_label: record.category.label().to_string(),
        created_at_ms: record.created_at,
    }
}

fn to_post_item(post: Keyed<PostId, Post>, viewer: &UserId) -> PostItem {
    let Keyed { id, record } = post;
    PostItem {
        post_id: id.to_string(),
        encouragement_count: count(record.encouragement_count()),
        encouraged_by_me: record.is_encouraged_by(viewer),
        comment_count: count(record.comments.len()),
        is_mine: &record.author_id == viewer,
        author_name: record.author_name,
        author_photo_url: record.author_photo_url,
        content: record.content,
        created_at_ms: record.created_at,
        edited: record.edited_at.is_some(),
    }
}

fn to_comment_item(comment: Keyed<CommentId, Comment>, viewer: &UserId) -> CommentItem {
    let Keyed { id, record } = comment;
    CommentItem {
        comment_id: id.to_string(),
        is_mine: &record.author_id == viewer,
        author_name: record.author_name,
        content: record.content,
        created_at_ms: record.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        auth_sign_in, auth_sign_out, core_version, dashboard_summary, feed_add_comment,
        feed_create_post, feed_delete_comment, feed_list, feed_list_comments,
        feed_toggle_encouragement, goals_create, goals_delete, goals_list, goals_reset_daily,
        goals_set_completed, goals_update, init_logging, journal_create, journal_export_pdf,
        journal_get, journal_list, journal_update, onboarding_complete, parse_date_patch,
        parse_optional_date, ping, session_poll, session_route, session_unwatch, session_watch,
        store_conflict, tasks_create, tasks_list, tasks_orphaned, tasks_overdue, tasks_update,
    };
    use goalkeep_core::AppConfig;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn optional_dates_accept_blank_and_reject_garbage() {
        assert_eq!(parse_optional_date("due_date", None).unwrap(), None);
        assert_eq!(parse_optional_date("due_date", Some("  ")).unwrap(), None);
        assert!(parse_optional_date("due_date", Some("2026-02-30")).is_err());
        assert!(parse_optional_date("due_date", Some("2026-02-03"))
            .unwrap()
            .is_some());
    }

    #[test]
    fn store_conflict_names_only_the_differing_path() {
        let active = AppConfig {
            db_path: "/data/goalkeep.sqlite3".into(),
            blob_dir: "/data/blobs".into(),
            ..AppConfig::default()
        };
        assert_eq!(store_conflict(&active, &active.clone()), None);

        let other_blobs = AppConfig {
            blob_dir: "/elsewhere/blobs".into(),
            ..active.clone()
        };
        let message = store_conflict(&active, &other_blobs).unwrap();
        assert!(message.contains("blob_dir is `/data/blobs`, not `/elsewhere/blobs`"));
        assert!(!message.contains("db_path"));

        let other_db = AppConfig {
            db_path: "/elsewhere/goalkeep.sqlite3".into(),
            ..active.clone()
        };
        let message = store_conflict(&active, &other_db).unwrap();
        assert!(message.contains("db_path"));
        assert!(!message.contains("blob_dir"));
    }

    #[test]
    fn date_patch_distinguishes_untouched_from_cleared() {
        assert_eq!(parse_date_patch("due_date", None).unwrap(), None);
        assert_eq!(
            parse_date_patch("due_date", Some(String::new())).unwrap(),
            Some(None)
        );
        assert!(parse_date_patch("due_date", Some("2026-03-01".to_string()))
            .unwrap()
            .unwrap()
            .is_some());
        assert!(parse_date_patch("due_date", Some("soon".to_string())).is_err());
    }

    // The session is process-wide, so every signed-in step lives in this one test.
    #[test]
    fn screen_flow_from_sign_in_to_sign_out() {
        let user_id = unique_token("ffi-user");

        assert!(!goals_list().ok);
        assert_eq!(session_route("goals".to_string()).screen, "auth");
        let watch = session_watch();

        let signed_in = auth_sign_in(user_id.clone(), format!("{user_id}@example.com"), None, None);
        assert!(signed_in.ok, "{}", signed_in.message);
        let events = session_poll(watch).events;
        assert_eq!(events.len(), 2);
        assert!(!events[0].signed_in);
        assert_eq!(events[1].user_id.as_deref(), Some(user_id.as_str()));
        let route = session_route("goals".to_string());
        assert_eq!(route.screen, "onboarding");
        assert!(route.redirected);

        let onboarded = onboarding_complete("Tester".to_string());
        assert!(onboarded.ok, "{}", onboarded.message);
        assert_eq!(session_route("goals".to_string()).screen, "goals");
        let events = session_poll(watch).events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].display_name.as_deref(), Some("Tester"));
        assert!(session_unwatch(watch).ok);
        assert!(!session_unwatch(watch).ok);
        assert!(!session_poll(watch).ok);

        let goal = goals_create(
            "Run 5k".to_string(),
            String::new(),
            Some("2026-12-31".to_string()),
            false,
            vec!["1k".to_string()],
        );
        assert!(goal.ok, "{}", goal.message);
        let goal_id = goal.id.unwrap();
        let listed = goals_list();
        assert_eq!(listed.items.len(), 1);
        assert_eq!(listed.items[0].target_date.as_deref(), Some("2026-12-31"));
        assert_eq!(listed.items[0].milestones.len(), 1);

        let edited = goals_update(
            goal_id.clone(),
            Some("Run 10k".to_string()),
            None,
            Some(String::new()),
            Some(true),
        );
        assert!(edited.ok, "{}", edited.message);
        let listed = goals_list();
        assert_eq!(listed.items[0].title, "Run 10k");
        assert_eq!(listed.items[0].target_date, None);
        assert!(listed.items[0].is_daily_goal);
        assert!(!goals_update(goal_id.clone(), Some("  ".to_string()), None, None, None).ok);

        let task = tasks_create(
            "Buy shoes".to_string(),
            String::new(),
            goal_id.clone(),
            Some("2026-01-01".to_string()),
        );
        assert!(task.ok, "{}", task.message);
        let task_id = task.id.unwrap();
        assert!(goals_set_completed(goal_id.clone(), true).ok);

        let summary = dashboard_summary("2026-01-02".to_string());
        assert!(summary.ok, "{}", summary.message);
        assert_eq!(summary.completed_goals, 1);
        assert_eq!(summary.overdue_tasks, 1);

        let reset = goals_reset_daily(i64::MAX);
        assert!(reset.ok, "{}", reset.message);
        assert_eq!(reset.message, "Reopened 1 daily goal(s).");
        assert!(!goals_list().items[0].completed);

        assert_eq!(tasks_overdue("2026-01-02".to_string()).items.len(), 1);
        let task_edit = tasks_update(
            task_id.clone(),
            Some("Buy running shoes".to_string()),
            None,
            None,
            Some(String::new()),
        );
        assert!(task_edit.ok, "{}", task_edit.message);
        assert!(tasks_overdue("2026-01-02".to_string()).items.is_empty());
        assert!(!tasks_overdue("tomorrow".to_string()).ok);
        assert!(!tasks_update(task_id, None, None, Some("no-such-goal".to_string()), None).ok);
        assert!(tasks_orphaned().items.is_empty());

        let deleted = goals_delete(goal_id.clone(), None);
        assert!(deleted.ok, "{}", deleted.message);
        assert!(deleted.message.contains("still reference"));
        let tasks = tasks_list(None, true);
        assert_eq!(tasks.items.len(), 1);
        assert_eq!(tasks.items[0].goal_id, goal_id);
        assert_eq!(tasks.items[0].title, "Buy running shoes");
        assert_eq!(tasks_orphaned().items.len(), 1);
        assert!(!goals_delete("x".to_string(), Some("bogus".to_string())).ok);

        let entry = journal_create(
            "Day one".to_string(),
            "Started.".to_string(),
            "progress".to_string(),
        );
        assert!(entry.ok, "{}", entry.message);
        assert_eq!(journal_list(Some("progress".to_string())).items.len(), 1);
        assert!(journal_list(Some("gratitude".to_string())).items.is_empty());
        assert!(!journal_list(Some("unknown".to_string())).ok);
        let entry_id = entry.id.unwrap();
        let fetched = journal_get(entry_id.clone());
        assert_eq!(fetched.item.unwrap().title, "Day one");
        let fetched_missing = journal_get("missing".to_string());
        assert!(fetched_missing.ok);
        assert!(fetched_missing.item.is_none());
        let entry_edit = journal_update(
            entry_id.clone(),
            Some("Day 1".to_string()),
            None,
            Some("reflection".to_string()),
        );
        assert!(entry_edit.ok, "{}", entry_edit.message);
        assert!(journal_list(Some("progress".to_string())).items.is_empty());
        assert_eq!(
            journal_list(Some("reflection".to_string())).items[0].title,
            "Day 1"
        );
        let exported = journal_export_pdf(entry_id);
        assert!(exported.ok, "{}", exported.message);
        assert!(exported.bytes.starts_with(b"%PDF"));

        let post = feed_create_post(format!("hello from {user_id}"));
        assert!(post.ok, "{}", post.message);
        let post_id = post.id.unwrap();
        assert_eq!(
            feed_toggle_encouragement(post_id.clone()).message,
            "encouraged"
        );
        let comment = feed_add_comment(post_id.clone(), "nice".to_string());
        assert!(comment.ok, "{}", comment.message);
        let mine = feed_list()
            .items
            .into_iter()
            .find(|item| item.post_id == post_id)
            .unwrap();
        assert!(mine.is_mine);
        assert!(mine.encouraged_by_me);
        assert_eq!(mine.comment_count, 1);
        assert_eq!(mine.author_name, "Tester");
        assert!(feed_delete_comment(post_id.clone(), comment.id.unwrap()).ok);
        assert!(feed_list_comments(post_id).items.is_empty());

        assert!(auth_sign_out().ok);
        assert!(!goals_list().ok);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
