//! Domain records persisted in the document store.
//!
//! # Responsibility
//! - Define the user, goal, task, journal, post and comment records.
//! - Define partial-update patches mapped onto store `update` fields.
//!
//! # Invariants
//! - Records serialize with camelCase keys; timestamps are epoch millis and
//!   calendar dates are `YYYY-MM-DD`.
//! - Records carry no identifier of their own; the store key is the id.

use chrono::Utc;

pub mod goal;
pub mod ids;
pub mod journal;
pub mod post;
pub mod task;
pub mod user;

/// Unix epoch milliseconds.
pub type EpochMs = i64;

/// A record together with the store key it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyed<I, T> {
    pub id: I,
    pub record: T,
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> EpochMs {
    Utc::now().timestamp_millis()
}
