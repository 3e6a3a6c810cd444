//! Static access annotations declared by pages.
//!
//! A page declares which `(action, subject)` pair it needs and whether it
//! requires a signed-in user or is reserved for guests. The guards in the
//! client crate consume these annotations.
use crate::{Action, Subject};
use serde::{Deserialize, Serialize};

/// `(action, subject)` pair a page requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    pub action: Action,
    pub subject: Subject,
}

impl Acl {
    pub fn new(action: impl Into<Action>, subject: impl Into<Subject>) -> Self {
        Self {
            action: action.into(),
            subject: subject.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAccess {
    #[serde(default)]
    pub acl: Option<Acl>,
    #[serde(default = "default_auth_required")]
    pub auth_required: bool,
    #[serde(default)]
    pub guest_only: bool,
}

fn default_auth_required() -> bool {
    true
}

impl RouteAccess {
    /// Signed-in page without an ACL requirement.
    pub fn public() -> Self {
        Self {
            acl: None,
            auth_required: true,
            guest_only: false,
        }
    }

    /// Signed-in page gated on `acl`.
    pub fn protected(acl: Acl) -> Self {
        Self {
            acl: Some(acl),
            auth_required: true,
            guest_only: false,
        }
    }

    /// Page reserved for visitors who are not signed in (login, register).
    pub fn guest() -> Self {
        Self {
            acl: None,
            auth_required: false,
            guest_only: true,
        }
    }
}

impl Default for RouteAccess {
    fn default() -> Self {
        Self::public()
    }
}
