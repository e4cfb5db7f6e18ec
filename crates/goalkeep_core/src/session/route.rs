//! Route guard for the app's screens.

use super::provider::Identity;

/// Every screen of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Auth,
    Onboarding,
    Dashboard,
    Goals,
    Tasks,
    Journal,
    Community,
    Account,
}

impl Screen {
    /// Screens that need a signed-in identity.
    pub fn is_protected(self) -> bool {
        !matches!(self, Self::Auth)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Onboarding => "onboarding",
            Self::Dashboard => "dashboard",
            Self::Goals => "goals",
            Self::Tasks => "tasks",
            Self::Journal => "journal",
            Self::Community => "community",
            Self::Account => "account",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let screen = match value.trim().to_ascii_lowercase().as_str() {
            "auth" => Self::Auth,
            "onboarding" => Self::Onboarding,
            "dashboard" => Self::Dashboard,
            "goals" => Self::Goals,
            "tasks" => Self::Tasks,
            "journal" => Self::Journal,
            "community" => Self::Community,
            "account" => Self::Account,
            _ => return None,
        };
        Some(screen)
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow(Screen),
    Redirect(Screen),
}

impl RouteDecision {
    /// The screen that ends up being shown.
    pub fn target(self) -> Screen {
        match self {
            Self::Allow(screen) | Self::Redirect(screen) => screen,
        }
    }
}

/// Resolves which screen to show for `requested`.
///
/// - Signed out: every protected screen redirects to `Auth`.
/// - Signed in: `Auth` redirects to `Dashboard` (or `Onboarding` when the
///   profile is not onboarded); every other screen requires onboarding first.
/// - `Onboarding` after completion redirects to `Dashboard`.
pub fn resolve_route(
    requested: Screen,
    identity: Option<&Identity>,
    onboarded: bool,
) -> RouteDecision {
    let home = if onboarded {
        Screen::Dashboard
    } else {
        Screen::Onboarding
    };

    match (identity, requested) {
        (None, Screen::Auth) => RouteDecision::Allow(Screen::Auth),
        (None, _) => RouteDecision::Redirect(Screen::Auth),
        (Some(_), Screen::Auth) => RouteDecision::Redirect(home),
        (Some(_), Screen::Onboarding) if onboarded => RouteDecision::Redirect(Screen::Dashboard),
        (Some(_), Screen::Onboarding) => RouteDecision::Allow(Screen::Onboarding),
        (Some(_), _) if !onboarded => RouteDecision::Redirect(Screen::Onboarding),
        (Some(_), screen) => RouteDecision::Allow(screen),
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_route, RouteDecision, Screen};
    use crate::session::Identity;

    fn identity() -> Identity {
        Identity {
            user_id: "u1".parse().unwrap(),
            email: "u1@example.com".into(),
            display_name: None,
            photo_url: None,
        }
    }

    #[test]
    fn signed_out_users_are_sent_to_auth() {
        for screen in [Screen::Dashboard, Screen::Goals, Screen::Account] {
            assert_eq!(
                resolve_route(screen, None, false),
                RouteDecision::Redirect(Screen::Auth)
            );
        }
        assert_eq!(
            resolve_route(Screen::Auth, None, false),
            RouteDecision::Allow(Screen::Auth)
        );
    }

    #[test]
    fn signed_in_users_must_finish_onboarding() {
        let who = identity();
        assert_eq!(
            resolve_route(Screen::Goals, Some(&who), false),
            RouteDecision::Redirect(Screen::Onboarding)
        );
        assert_eq!(
            resolve_route(Screen::Auth, Some(&who), false).target(),
            Screen::Onboarding
        );
        assert_eq!(
            resolve_route(Screen::Goals, Some(&who), true),
            RouteDecision::Allow(Screen::Goals)
        );
        assert_eq!(
            resolve_route(Screen::Onboarding, Some(&who), true),
            RouteDecision::Redirect(Screen::Dashboard)
        );
    }

    #[test]
    fn screen_names_roundtrip() {
        assert_eq!(Screen::parse(" Community "), Some(Screen::Community));
        assert_eq!(Screen::parse("settings"), None);
        assert!(!Screen::Auth.is_protected());
        assert!(Screen::Journal.is_protected());
    }
}
