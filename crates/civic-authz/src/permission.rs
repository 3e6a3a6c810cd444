//! Permission primitives granted to a role.
//!
//! # Purpose
//! Defines the `{subject, actions}` shape the backend attaches to a role and the
//! compact `action:subject` string form used in configuration and logs.
//!
//! # Key invariants
//! - `actions` is a set; duplicates collapse on construction.
//! - After [`normalize_permissions`] each subject appears once, with the union
//!   of every action granted for it.
//!
//! # Examples
//! ```rust
//! use civic_authz::Permission;
//!
//! let permission: Permission = "read:users".parse().expect("parse");
//! assert_eq!(permission.subject.as_str(), "users");
//! assert_eq!(permission.as_strings(), vec!["read:users".to_string()]);
//! ```
//!
//! # Common pitfalls
//! - The string form puts the action first, mirroring `can(action, subject)`.
use crate::{Action, AuthzError, AuthzResult, Subject};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What a role may do to one resource class.
///
/// # Example
/// ```rust
/// use civic_authz::Permission;
///
/// let permission = Permission::new("complaints", ["read", "update", "read"]);
/// assert_eq!(permission.actions.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub subject: Subject,
    pub actions: BTreeSet<Action>,
}

impl Permission {
    /// Create a permission from a subject and any iterable of actions.
    pub fn new<S, I, A>(subject: S, actions: I) -> Self
    where
        S: Into<Subject>,
        I: IntoIterator<Item = A>,
        A: Into<Action>,
    {
        Self {
            subject: subject.into(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this entry grants `action`.
    pub fn grants(&self, action: &Action) -> bool {
        self.actions.contains(action)
    }

    /// Render one `action:subject` string per granted action.
    ///
    /// # Performance
    /// - Allocates a new `String` per action.
    pub fn as_strings(&self) -> Vec<String> {
        self.actions
            .iter()
            .map(|action| format!("{}:{}", action.as_str(), self.subject.as_str()))
            .collect()
    }
}

impl std::str::FromStr for Permission {
    type Err = AuthzError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // Split on the first colon to recover action and subject.
        let (action, subject) = value
            .split_once(':')
            .ok_or_else(|| AuthzError::InvalidPermission(value.to_string()))?;
        let action = action.trim();
        let subject = subject.trim();
        if action.is_empty() {
            return Err(AuthzError::InvalidAction(action.to_string()));
        }
        if subject.is_empty() {
            return Err(AuthzError::InvalidPermission(value.to_string()));
        }
        Ok(Self::new(subject, [action]))
    }
}

impl Permission {
    /// Parse a permission from its `action:subject` form.
    ///
    /// # Errors
    /// - [`AuthzError::InvalidPermission`] if the colon or subject is missing.
    /// - [`AuthzError::InvalidAction`] if the action is empty.
    pub fn parse(value: &str) -> AuthzResult<Self> {
        value.parse()
    }

    /// Parse a list of `action:subject` strings, stopping at the first error.
    pub fn parse_all<S: AsRef<str>>(values: &[S]) -> AuthzResult<Vec<Self>> {
        let mut parsed = Vec::with_capacity(values.len());
        for value in values {
            parsed.push(Self::parse(value.as_ref())?);
        }
        Ok(parsed)
    }
}

/// Merge entries sharing a subject into one entry holding the union of actions.
///
/// Output is ordered by subject so repeated normalization is stable.
pub fn normalize_permissions(permissions: impl IntoIterator<Item = Permission>) -> Vec<Permission> {
    let mut merged: BTreeMap<Subject, BTreeSet<Action>> = BTreeMap::new();
    for permission in permissions {
        merged
            .entry(permission.subject)
            .or_default()
            .extend(permission.actions);
    }
    merged
        .into_iter()
        .map(|(subject, actions)| Permission { subject, actions })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_action_and_subject() {
        let permission = Permission::parse("read:dashboard").expect("parse permission");
        assert_eq!(permission.subject, Subject::new("dashboard"));
        assert!(permission.grants(&Action::read()));
    }

    #[test]
    fn parse_missing_colon() {
        let err = Permission::parse("read").expect_err("missing subject");
        assert!(matches!(err, AuthzError::InvalidPermission(_)));
    }

    #[test]
    fn parse_empty_parts() {
        assert!(matches!(
            Permission::parse(":users"),
            Err(AuthzError::InvalidAction(_))
        ));
        assert!(matches!(
            Permission::parse("read: "),
            Err(AuthzError::InvalidPermission(_))
        ));
    }

    #[test]
    fn parse_all_stops_on_error() {
        let ok = Permission::parse_all(&["read:users", "create:shifts"]).expect("parse all");
        assert_eq!(ok.len(), 2);
        assert!(Permission::parse_all(&["read:users", "bogus"]).is_err());
    }

    #[test]
    fn normalize_unions_actions() {
        let normalized = normalize_permissions(vec![
            Permission::new("users", ["read"]),
            Permission::new("complaints", ["read"]),
            Permission::new("users", ["create", "read"]),
        ]);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].subject.as_str(), "complaints");
        assert_eq!(normalized[1].subject.as_str(), "users");
        assert_eq!(
            normalized[1].as_strings(),
            vec!["create:users".to_string(), "read:users".to_string()]
        );
    }

    #[test]
    fn decodes_backend_role_shape() {
        let raw = r#"{"subject":"vehicles","actions":["read","update","read"]}"#;
        let permission: Permission = serde_json::from_str(raw).expect("decode permission");
        assert_eq!(permission.subject.as_str(), "vehicles");
        assert_eq!(permission.actions.len(), 2);
    }
}
