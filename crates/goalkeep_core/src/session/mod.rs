//! Navigation/session shell.
//!
//! # Responsibility
//! - Hold the one process-wide authenticated identity.
//! - Notify subscribed screens on sign-in, sign-out and profile changes.
//! - Decide which screen a navigation request may show.
//!
//! # Invariants
//! - Screens receive the provider by reference; they never create their own.
//! - Listeners run outside the state lock and may call back into the provider.

mod provider;
mod route;

pub use provider::{global_session, Identity, SessionError, SessionProvider, SubscriptionId};
pub use route::{resolve_route, RouteDecision, Screen};
