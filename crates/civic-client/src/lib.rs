//! Client library behind the municipal complaints dashboard.
//!
//! # Purpose
//! Everything the dashboard needs below its widgets: session and ability
//! tracking, page guards, the filtered complaint list with sequenced fetches,
//! and the push channel that keeps the list fresh.
//!
//! # How it fits
//! A composition root loads [`ClientConfig`], builds an [`HttpComplaintsApi`],
//! opens one [`PushChannel`] and hands both to each [`ComplaintsView`] it
//! shows. [`RefreshBinding`] connects the two for the lifetime of the view.
//!
//! # Key invariants
//! - The list always shows the result of the most recently issued fetch.
//! - Fetch failures degrade the view (alert, stale data) and are never fatal.
//! - Push listeners are scoped; dropping a binding detaches it.
//!
//! # Examples
//! ```rust,no_run
//! use civic_client::{
//!     ClientConfig, ComplaintsView, HttpComplaintsApi, LogAlertSink, PushChannel, RefreshBinding,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env();
//! let api = Arc::new(HttpComplaintsApi::new(&config)?);
//! let view = ComplaintsView::with_api(api, Arc::new(LogAlertSink), "waiting", config.page_size);
//! let channel = PushChannel::connect(&config)?;
//! let _binding = RefreshBinding::bind(&view, &channel);
//! view.refresh().await;
//! # Ok(())
//! # }
//! ```
pub mod alert;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod realtime;
pub mod session;

pub use alert::{Alert, AlertKind, AlertSink, ChannelAlertSink, LogAlertSink};
pub use api::{Complaint, ComplaintsApi, HttpComplaintsApi, ListRequest, ListResponse};
pub use client::query::{ListFilters, ListQuery, ListResult};
pub use client::search::SearchForm;
pub use client::store::{FetchOutcome, FilteredListStore, ListState, RefuseOutcome};
pub use client::view::ComplaintsView;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use guard::{
    AclGuard, AuthGuard, DenyReason, GuardDecision, GuardState, GuestGuard, MemoryNavigator,
    Navigator, apply_redirect,
};
pub use realtime::binding::RefreshBinding;
pub use realtime::channel::{
    ConnectionState, NOTIFICATION_EVENT, NotificationSubscription, PushChannel, PushEvent,
};
pub use session::{AuthState, MemoryPersistedState, PersistedState, Role, Session, User};
