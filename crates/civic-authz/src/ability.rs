//! Compiled authorization predicate for one session.
//!
//! # Purpose
//! Flattens a role's permissions into a set of `(action, subject)` rules and
//! answers `can(action, subject)` by exact lookup.
//!
//! # Key invariants
//! - `read:acl` is always registered so the UI can inspect its own ACL pages.
//! - An `Ability` never changes after construction; rebuild on role updates.
use crate::{Action, Permission, RouteAccess, Subject, normalize_permissions};
use std::collections::BTreeSet;

/// One allowed `(action, subject)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rule {
    pub action: Action,
    pub subject: Subject,
}

impl Rule {
    pub fn new(action: impl Into<Action>, subject: impl Into<Subject>) -> Self {
        Self {
            action: action.into(),
            subject: subject.into(),
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.action, self.subject)
    }
}

/// Accumulates rules before freezing them into an [`Ability`].
#[derive(Debug, Default)]
pub struct AbilityBuilder {
    rules: BTreeSet<Rule>,
}

impl AbilityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, action: impl Into<Action>, subject: impl Into<Subject>) -> Self {
        self.rules.insert(Rule::new(action, subject));
        self
    }

    pub fn allow_permission(mut self, permission: &Permission) -> Self {
        for action in &permission.actions {
            self.rules
                .insert(Rule::new(action.clone(), permission.subject.clone()));
        }
        self
    }

    /// Freeze the rules, adding the unconditional `read:acl` bootstrap rule.
    pub fn build(self) -> Ability {
        let mut rules = self.rules;
        rules.insert(Rule::new(Action::read(), Subject::acl()));
        Ability { rules }
    }
}

/// Read-only authorization predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ability {
    rules: BTreeSet<Rule>,
}

impl Ability {
    /// Build an ability from a role's permission list.
    pub fn from_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        normalize_permissions(permissions)
            .iter()
            .fold(AbilityBuilder::new(), |builder, permission| {
                builder.allow_permission(permission)
            })
            .build()
    }

    /// Ability of a session with no granted permissions.
    pub fn bootstrap() -> Self {
        AbilityBuilder::new().build()
    }

    pub fn can(&self, action: &str, subject: &str) -> bool {
        // BTreeSet lookup needs owned keys; rules are few so a scan is fine.
        self.rules
            .iter()
            .any(|rule| rule.action.as_str() == action && rule.subject.as_str() == subject)
    }

    pub fn cannot(&self, action: &str, subject: &str) -> bool {
        !self.can(action, subject)
    }

    /// Whether a page annotated with `access` may be rendered.
    ///
    /// Pages without an ACL annotation are always permitted.
    pub fn permits(&self, access: &RouteAccess) -> bool {
        match &access.acl {
            Some(acl) => self.can(acl.action.as_str(), acl.subject.as_str()),
            None => true,
        }
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Never true: every ability carries the built-in `read:acl` rule.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for Ability {
    fn default() -> Self {
        Self::bootstrap()
    }
}

/// Free-function form of [`Ability::from_permissions`].
pub fn build_ability(permissions: impl IntoIterator<Item = Permission>) -> Ability {
    Ability::from_permissions(permissions)
}
