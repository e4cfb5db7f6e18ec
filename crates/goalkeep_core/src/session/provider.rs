//! Session provider with explicit subscribe/unsubscribe lifecycle.

use crate::model::ids::UserId;
use log::info;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static GLOBAL_SESSION: Lazy<SessionProvider> = Lazy::new(SessionProvider::new);

/// Returns the process-wide session provider.
pub fn global_session() -> &'static SessionProvider {
    &GLOBAL_SESSION
}

/// Authenticated identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl Identity {
    /// Name shown on posts and comments; falls back to the email local part.
    pub fn author_name(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .filter(|local| !local.is_empty())
                .unwrap_or("anonymous")
                .to_string(),
        }
    }
}

/// Authentication failure surfaced to screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NotSignedIn,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "no signed-in user"),
        }
    }
}

impl Error for SessionError {}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = dyn Fn(Option<&Identity>) + Send + Sync;

#[derive(Default)]
struct SessionState {
    current: Option<Identity>,
    listeners: BTreeMap<SubscriptionId, Arc<Listener>>,
    next_id: u64,
}

/// Thread-safe holder of the current identity.
#[derive(Default)]
pub struct SessionProvider {
    state: Mutex<SessionState>,
}

impl SessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Identity> {
        self.lock().current.clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.lock().current.is_some()
    }

    /// Current identity, or `NotSignedIn` for protected operations.
    pub fn require_identity(&self) -> Result<Identity, SessionError> {
        self.current().ok_or(SessionError::NotSignedIn)
    }

    pub fn sign_in(&self, identity: Identity) {
        self.lock().current = Some(identity);
        info!("event=session_change module=session status=ok signed_in=true");
        self.notify();
    }

    /// Clears the identity; a no-op (without notification) when signed out.
    pub fn sign_out(&self) {
        let was_signed_in = self.lock().current.take().is_some();
        if was_signed_in {
            info!("event=session_change module=session status=ok signed_in=false");
            self.notify();
        }
    }

    /// Provider-side profile update (display name and photo URL).
    pub fn update_profile(
        &self,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Result<Identity, SessionError> {
        let updated = {
            let mut state = self.lock();
            let identity = state.current.as_mut().ok_or(SessionError::NotSignedIn)?;
            if display_name.is_some() {
                identity.display_name = display_name;
            }
            if photo_url.is_some() {
                identity.photo_url = photo_url;
            }
            identity.clone()
        };
        info!("event=session_profile_update module=session status=ok");
        self.notify();
        Ok(updated)
    }

    /// Registers `listener`; it is called once immediately with the current
    /// identity and again after every change until unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(Option<&Identity>) + Send + Sync + 'static,
    {
        let listener: Arc<Listener> = Arc::new(listener);
        let (id, current) = {
            let mut state = self.lock();
            let id = SubscriptionId(state.next_id);
            state.next_id += 1;
            state.listeners.insert(id, Arc::clone(&listener));
            (id, state.current.clone())
        };
        listener(current.as_ref());
        id
    }

    /// Returns whether the subscription was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().listeners.remove(&id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn notify(&self) {
        let (current, listeners) = {
            let state = self.lock();
            (
                state.current.clone(),
                state.listeners.values().cloned().collect::<Vec<_>>(),
            )
        };
        for listener in listeners {
            listener(current.as_ref());
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{Identity, SessionError, SessionProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn identity(user: &str) -> Identity {
        Identity {
            user_id: user.parse().unwrap(),
            email: format!("{user}@example.com"),
            display_name: None,
            photo_url: None,
        }
    }

    #[test]
    fn subscribe_delivers_current_state_then_changes() {
        let session = SessionProvider::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = session.subscribe(move |identity| {
            sink.lock()
                .unwrap()
                .push(identity.map(|i| i.user_id.to_string()));
        });

        session.sign_in(identity("u1"));
        session.sign_out();
        assert!(session.unsubscribe(id));
        session.sign_in(identity("u2"));

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen, vec![None, Some("u1".to_string()), None]);
        assert!(!session.unsubscribe(id));
    }

    #[test]
    fn sign_out_when_signed_out_does_not_notify() {
        let session = SessionProvider::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        session.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        session.sign_out();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn require_identity_and_profile_update_need_sign_in() {
        let session = SessionProvider::new();
        assert_eq!(session.require_identity(), Err(SessionError::NotSignedIn));
        assert_eq!(
            session.update_profile(Some("x".into()), None),
            Err(SessionError::NotSignedIn)
        );

        session.sign_in(identity("u1"));
        let updated = session
            .update_profile(Some("Ana".into()), Some("file:///a.png".into()))
            .unwrap();
        assert_eq!(updated.author_name(), "Ana");
        assert_eq!(
            session.current().unwrap().photo_url.as_deref(),
            Some("file:///a.png")
        );
    }

    #[test]
    fn author_name_falls_back_to_email_local_part() {
        assert_eq!(identity("u7").author_name(), "u7");
    }

    #[test]
    fn listener_may_read_provider_during_notification() {
        let session = Arc::new(SessionProvider::new());
        let inner = Arc::clone(&session);
        let observed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&observed);
        session.subscribe(move |_| {
            if inner.is_signed_in() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        session.sign_in(identity("u1"));
        assert_eq!(observed.load(Ordering::SeqCst), 1);
    }
}
