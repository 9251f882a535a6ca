//! Route guarding from session state.

use super::models::SessionState;
use crate::navigation::{Navigator, routes};

/// Who may see a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any signed-in user
    Authenticated,
    /// Signed-in platform admins only; others are sent to their dashboard
    PlatformAdmin,
    /// Signed-out visitors only (login, registration)
    GuestOnly,
}

/// Outcome of guarding a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Startup check still running; show a placeholder
    Loading,
    /// Show the view
    Render,
    /// Replace the current view with another path
    Redirect(&'static str),
}

impl GuardDecision {
    /// Perform the redirect, if any. Returns whether the view may render.
    pub fn follow(self, navigator: &dyn Navigator) -> bool {
        match self {
            GuardDecision::Redirect(path) => {
                navigator.navigate(path);
                false
            }
            GuardDecision::Loading => false,
            GuardDecision::Render => true,
        }
    }
}

/// Decide what to show for a view with the given access level
pub fn check(state: &SessionState, access: Access) -> GuardDecision {
    match (state, access) {
        (SessionState::Unknown, _) => GuardDecision::Loading,
        (SessionState::Anonymous, Access::GuestOnly) => GuardDecision::Render,
        (SessionState::Anonymous, _) => GuardDecision::Redirect(routes::LOGIN),
        (SessionState::Authenticated(_), Access::GuestOnly) => {
            GuardDecision::Redirect(routes::USER_DASHBOARD)
        }
        (SessionState::Authenticated(_), Access::Authenticated) => GuardDecision::Render,
        (SessionState::Authenticated(user), Access::PlatformAdmin) => {
            if user.is_platform_admin() {
                GuardDecision::Render
            } else {
                GuardDecision::Redirect(routes::USER_DASHBOARD)
            }
        }
    }
}
