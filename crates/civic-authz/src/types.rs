//! Strongly typed action and subject identifiers.
//!
//! # Purpose
//! Wraps the opaque strings the backend uses for verbs (`read`, `create`) and
//! resource classes (`dashboard`, `users`) so they cannot be swapped by accident.
//!
//! # Key invariants
//! - Display and `as_str` return the original value unchanged.
//! - Values are not validated here; see [`crate::Permission`] parsing.
use serde::{Deserialize, Serialize};

/// Verb a role may perform on a subject.
///
/// # Example
/// ```rust
/// use civic_authz::Action;
///
/// assert_eq!(Action::read().as_str(), "read");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The bootstrap verb used by the built-in `read:acl` rule.
    pub fn read() -> Self {
        Self::new("read")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Protected resource class, e.g. `users` or `complaints`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Subject guarding the ACL subsystem itself.
    pub fn acl() -> Self {
        Self::new("acl")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Subject {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Subject {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, Subject};

    #[test]
    fn constructors_and_display() {
        assert_eq!(Action::read().to_string(), "read");
        assert_eq!(Subject::acl().as_str(), "acl");
        assert_eq!(Action::from("create"), Action::new("create"));
        assert_eq!(Subject::from("users".to_string()).to_string(), "users");
    }

    #[test]
    fn serde_is_transparent() {
        let action: Action = serde_json::from_str("\"delete\"").expect("decode action");
        assert_eq!(action.as_str(), "delete");
        let rendered = serde_json::to_string(&Subject::new("shifts")).expect("encode subject");
        assert_eq!(rendered, "\"shifts\"");
    }
}
