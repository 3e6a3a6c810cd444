//! Render-gating guards keyed on session and route readiness.
//!
//! # Purpose
//! Decide whether a page renders its content, a fallback, or redirects.
//!
//! # How it fits
//! Each page carries a [`RouteAccess`] annotation. The composing layer runs the
//! matching guard on every route change and applies the returned redirect
//! through a [`Navigator`].
//!
//! # Key invariants
//! - While the router is not ready nothing is decided and nothing redirects.
//! - Redirects are idempotent: already being on the target is a no-op.
//! - Authorization denials never surface as errors; they are decisions.
use crate::session::{PersistedState, Session};
use civic_authz::{Ability, RouteAccess};
use std::sync::Arc;

pub const HOME_ROUTE: &str = "/";
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The forced-logout marker is present.
    SessionExpired,
    /// A guest-only page was visited while signed in.
    AlreadyAuthenticated,
    /// A signed-in page was visited without a session.
    Unauthenticated,
    /// The session ability does not cover the page ACL.
    NotAuthorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Checking,
    Allowed,
    Denied(DenyReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardDecision {
    pub state: GuardState,
    pub redirect: Option<String>,
}

impl GuardDecision {
    fn checking() -> Self {
        Self {
            state: GuardState::Checking,
            redirect: None,
        }
    }

    fn allowed() -> Self {
        Self {
            state: GuardState::Allowed,
            redirect: None,
        }
    }

    fn denied(reason: DenyReason, redirect: Option<String>) -> Self {
        Self {
            state: GuardState::Denied(reason),
            redirect,
        }
    }

    /// Whether the page content (rather than the fallback) should render.
    pub fn renders_content(&self) -> bool {
        self.state == GuardState::Allowed
    }
}

/// Client-side router as seen by the guards.
pub trait Navigator {
    fn is_ready(&self) -> bool;
    fn current_route(&self) -> &str;
    fn replace(&mut self, route: &str);
}

/// Perform the decision's redirect unless the navigator is already there.
///
/// Returns `true` when `replace` was invoked.
pub fn apply_redirect<N: Navigator + ?Sized>(decision: &GuardDecision, navigator: &mut N) -> bool {
    let Some(target) = decision.redirect.as_deref() else {
        return false;
    };
    if !navigator.is_ready() || navigator.current_route() == target {
        return false;
    }
    tracing::debug!(from = navigator.current_route(), to = target, "guard redirect");
    navigator.replace(target);
    true
}

/// Guard for pages reserved for visitors who are not signed in.
#[derive(Clone)]
pub struct GuestGuard {
    persisted: Arc<dyn PersistedState>,
    expiration_key: String,
}

impl GuestGuard {
    pub fn new(persisted: Arc<dyn PersistedState>, expiration_key: impl Into<String>) -> Self {
        Self {
            persisted,
            expiration_key: expiration_key.into(),
        }
    }

    pub fn evaluate<N: Navigator + ?Sized>(&self, session: &Session, navigator: &N) -> GuardDecision {
        if !navigator.is_ready() {
            return GuardDecision::checking();
        }
        if self.persisted.contains(&self.expiration_key) {
            return GuardDecision::denied(DenyReason::SessionExpired, Some(HOME_ROUTE.to_string()));
        }
        if session.loading {
            return GuardDecision::checking();
        }
        if session.user.is_some() {
            return GuardDecision::denied(DenyReason::AlreadyAuthenticated, None);
        }
        GuardDecision::allowed()
    }

    /// Evaluate and apply any redirect; call on every route change.
    pub fn check<N: Navigator + ?Sized>(&self, session: &Session, navigator: &mut N) -> GuardState {
        let decision = self.evaluate(session, navigator);
        apply_redirect(&decision, navigator);
        decision.state
    }
}

/// Guard for pages that need a signed-in user.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthGuard;

impl AuthGuard {
    pub fn evaluate<N: Navigator + ?Sized>(&self, session: &Session, navigator: &N) -> GuardDecision {
        if !navigator.is_ready() || session.loading {
            return GuardDecision::checking();
        }
        if session.user.is_none() {
            let redirect = login_redirect(navigator.current_route());
            return GuardDecision::denied(DenyReason::Unauthenticated, Some(redirect));
        }
        GuardDecision::allowed()
    }

    pub fn check<N: Navigator + ?Sized>(&self, session: &Session, navigator: &mut N) -> GuardState {
        let decision = self.evaluate(session, navigator);
        apply_redirect(&decision, navigator);
        decision.state
    }
}

// `/login?returnUrl=<route>`, or plain `/login` when coming from home or login.
fn login_redirect(current: &str) -> String {
    let path = current
        .split_once(['?', '#'])
        .map_or(current, |(path, _)| path);
    if path == HOME_ROUTE || path == LOGIN_ROUTE {
        return LOGIN_ROUTE.to_string();
    }
    match reqwest::Url::parse_with_params("http://localhost/login", &[("returnUrl", current)]) {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        Err(_) => LOGIN_ROUTE.to_string(),
    }
}

/// Guard matching a page ACL annotation against the session ability.
#[derive(Debug, Clone)]
pub struct AclGuard {
    access: RouteAccess,
}

impl AclGuard {
    pub fn new(access: RouteAccess) -> Self {
        Self { access }
    }

    pub fn access(&self) -> &RouteAccess {
        &self.access
    }

    pub fn evaluate<N: Navigator + ?Sized>(
        &self,
        session: &Session,
        ability: &Ability,
        navigator: &N,
    ) -> GuardDecision {
        if !navigator.is_ready() || session.loading {
            return GuardDecision::checking();
        }
        if self.access.guest_only || !self.access.auth_required {
            return GuardDecision::allowed();
        }
        if session.user.is_some() && ability.permits(&self.access) {
            return GuardDecision::allowed();
        }
        GuardDecision::denied(DenyReason::NotAuthorized, None)
    }
}

/// In-memory navigator used by headless consumers and tests.
#[derive(Debug, Clone)]
pub struct MemoryNavigator {
    ready: bool,
    route: String,
    replacements: Vec<String>,
}

impl MemoryNavigator {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            ready: true,
            route: route.into(),
            replacements: Vec::new(),
        }
    }

    pub fn not_ready(route: impl Into<String>) -> Self {
        Self {
            ready: false,
            ..Self::new(route)
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn push(&mut self, route: impl Into<String>) {
        self.route = route.into();
    }

    pub fn replacements(&self) -> &[String] {
        &self.replacements
    }
}

impl Navigator for MemoryNavigator {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn current_route(&self) -> &str {
        &self.route
    }

    fn replace(&mut self, route: &str) {
        self.route = route.to_string();
        self.replacements.push(route.to_string());
    }
}
