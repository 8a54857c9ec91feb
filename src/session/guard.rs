//! Page gating on top of the session state.

use super::store::Session;

/// Who a page is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Signed-in users only (home feed, profile).
    Protected,
    /// Anonymous visitors only (sign-in, sign-up, Google completion and link).
    PublicOnly,
    /// Signed-in users whose email is not verified yet.
    EmailVerification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The startup resolution is still running; render nothing yet.
    Wait,
    Render,
    RedirectToSignIn,
    RedirectToHome,
}

pub fn guard(session: &Session, access: RouteAccess) -> RouteDecision {
    if session.loading {
        return RouteDecision::Wait;
    }

    match (access, &session.user) {
        (RouteAccess::Protected, None) => RouteDecision::RedirectToSignIn,
        (RouteAccess::Protected, Some(_)) => RouteDecision::Render,
        (RouteAccess::PublicOnly, None) => RouteDecision::Render,
        (RouteAccess::PublicOnly, Some(_)) => RouteDecision::RedirectToHome,
        (RouteAccess::EmailVerification, None) => RouteDecision::RedirectToSignIn,
        (RouteAccess::EmailVerification, Some(user)) if user.email_verified => {
            RouteDecision::RedirectToHome
        }
        (RouteAccess::EmailVerification, Some(_)) => RouteDecision::Render,
    }
}
