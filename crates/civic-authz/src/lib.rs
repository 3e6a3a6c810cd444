//! Client-side authorization primitives for the complaints dashboard.
//!
//! # Purpose
//! Turns the permissions granted to a user's role into an [`Ability`]: an
//! immutable, queryable set of `(action, subject)` pairs.
//!
//! # How it fits
//! The session layer rebuilds the ability on every login or permission edit,
//! and guards consult it together with the static [`RouteAccess`] annotation a
//! page declares.
//!
//! # Key invariants
//! - `can("read", "acl")` always holds, even for an empty permission list.
//! - Matching is exact; there are no wildcard or ownership rules.
//! - A subject appears at most once after [`normalize_permissions`].
//!
//! # Examples
//! ```rust
//! use civic_authz::{Ability, Permission};
//!
//! let ability = Ability::from_permissions(vec![Permission::new("users", ["read"])]);
//! assert!(ability.can("read", "users"));
//! assert!(!ability.can("write", "users"));
//! assert!(ability.can("read", "acl"));
//! ```
//!
//! # Common pitfalls
//! - Holding on to an old `Ability` after the role changes; rebuild instead.

mod ability;
mod errors;
mod permission;
mod route;
mod types;

pub use ability::{Ability, AbilityBuilder, Rule, build_ability};
pub use errors::{AuthzError, AuthzResult};
pub use permission::{Permission, normalize_permissions};
pub use route::{Acl, RouteAccess};
pub use types::{Action, Subject};
