//! Session state and the ability derived from it.
//!
//! # Purpose
//! Tracks who is signed in, whether the initial auth check is still running,
//! and the [`Ability`] compiled from the user's role.
//!
//! # Key invariants
//! - The ability is rebuilt on every sign-in, sign-out and permission edit and
//!   never mutated in between; readers share it through an `Arc`.
//! - `loading` is true only between [`AuthState::begin_check`] and the next
//!   sign-in or sign-out.
use civic_authz::{Ability, Permission};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub loading: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

struct AuthInner {
    session: Session,
    ability: Arc<Ability>,
}

/// Process-wide owner of the [`Session`] and its [`Ability`].
#[derive(Clone)]
pub struct AuthState {
    inner: Arc<RwLock<AuthInner>>,
}

impl AuthState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(AuthInner {
                session: Session::default(),
                ability: Arc::new(Ability::bootstrap()),
            })),
        }
    }

    /// Mark the initial authentication check as in progress.
    pub fn begin_check(&self) {
        self.inner.write().session.loading = true;
    }

    pub fn sign_in(&self, user: User) {
        let ability = Arc::new(Ability::from_permissions(user.role.permissions.clone()));
        tracing::info!(
            user = %user.email,
            role = %user.role.name,
            rules = ability.len(),
            "session signed in"
        );
        let mut inner = self.inner.write();
        inner.session = Session {
            user: Some(user),
            loading: false,
        };
        inner.ability = ability;
    }

    pub fn sign_out(&self) {
        let mut inner = self.inner.write();
        inner.session = Session::default();
        inner.ability = Arc::new(Ability::bootstrap());
        tracing::info!("session signed out");
    }

    /// Replace the signed-in user's permissions after a role edit.
    ///
    /// Returns `false` when nobody is signed in.
    pub fn update_permissions(&self, permissions: Vec<Permission>) -> bool {
        let mut inner = self.inner.write();
        let Some(user) = inner.session.user.as_mut() else {
            return false;
        };
        user.role.permissions = permissions;
        let ability = Arc::new(Ability::from_permissions(user.role.permissions.clone()));
        inner.ability = ability;
        true
    }

    pub fn session(&self) -> Session {
        self.inner.read().session.clone()
    }

    pub fn ability(&self) -> Arc<Ability> {
        self.inner.read().ability.clone()
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Small string key-value store that survives page reloads.
pub trait PersistedState: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

#[derive(Default)]
pub struct MemoryPersistedState {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryPersistedState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistedState for MemoryPersistedState {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}
