//! Filtered, paginated complaint list backed by the remote API.
//!
//! # Purpose
//! Fetches one page of complaints for a [`ListQuery`] and publishes the
//! resulting [`ListState`] to observers.
//!
//! # Concurrency + ordering guarantees
//! - Fetches may overlap (filter changes, pagination, push notifications).
//! - Every fetch takes a sequence number when issued; a response is applied
//!   only if its number is still the latest issued. The visible state is
//!   therefore always the result of the last *issued* fetch, never merely the
//!   last one to resolve.
//! - The check and the write happen under the watch channel lock, so a newer
//!   fetch can never be overwritten by an older one that resolves later.
//!
//! # Failure semantics
//! - API failures never reach the caller as errors. They are logged, an
//!   [`Alert`] is raised, and the last good result stays visible.
//! - `refuse` deletes server-side and then re-fetches with the same query; no
//!   item is removed locally.
use crate::alert::{Alert, AlertSink};
use crate::api::ComplaintsApi;
use crate::client::query::{ListQuery, ListResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response became the visible state.
    Applied,
    /// A newer fetch was issued (or the store closed) before this one resolved.
    Superseded,
    /// The API call failed; the previous result is still visible.
    Failed,
}

impl FetchOutcome {
    fn label(self) -> &'static str {
        match self {
            FetchOutcome::Applied => "applied",
            FetchOutcome::Superseded => "superseded",
            FetchOutcome::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefuseOutcome {
    /// Deleted server-side; carries the outcome of the resynchronizing fetch.
    Refused(FetchOutcome),
    /// The delete failed; no re-fetch was issued.
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListState {
    pub result: ListResult,
    /// True while the latest issued fetch is outstanding.
    pub loading: bool,
    pub last_error: Option<String>,
}

pub struct FilteredListStore {
    api: Arc<dyn ComplaintsApi>,
    alerts: Arc<dyn AlertSink>,
    issued: AtomicU64,
    closed: AtomicBool,
    state: watch::Sender<ListState>,
}

impl FilteredListStore {
    pub fn new(api: Arc<dyn ComplaintsApi>, alerts: Arc<dyn AlertSink>) -> Self {
        let (state, _) = watch::channel(ListState::default());
        Self {
            api,
            alerts,
            issued: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            state,
        }
    }

    pub async fn fetch(&self, query: &ListQuery) -> FetchOutcome {
        if self.is_closed() {
            tracing::debug!("store closed, fetch skipped");
            return FetchOutcome::Superseded;
        }
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| state.loading = true);
        tracing::debug!(
            seq,
            status = %query.status,
            page = query.page,
            name = %query.filters.name,
            date = %query.filters.date,
            "fetching complaints"
        );

        let result = self.api.list_with_status(&query.to_request()).await;

        let outcome = match result {
            Ok(response) => {
                let mut applied = false;
                self.state.send_if_modified(|state| {
                    if !self.is_latest(seq) {
                        return false;
                    }
                    state.result = response.into();
                    state.loading = false;
                    state.last_error = None;
                    applied = true;
                    true
                });
                if applied {
                    FetchOutcome::Applied
                } else {
                    FetchOutcome::Superseded
                }
            }
            Err(err) => {
                let mut latest = false;
                let message = err.to_string();
                self.state.send_if_modified(|state| {
                    if !self.is_latest(seq) {
                        return false;
                    }
                    state.loading = false;
                    state.last_error = Some(message.clone());
                    latest = true;
                    true
                });
                if latest {
                    tracing::error!(seq, error = %err, status = %query.status, "complaints fetch failed");
                    self.alerts.alert(Alert::fetch_failed());
                    FetchOutcome::Failed
                } else {
                    tracing::warn!(seq, error = %err, "superseded complaints fetch failed");
                    FetchOutcome::Superseded
                }
            }
        };

        if outcome == FetchOutcome::Superseded {
            tracing::debug!(seq, latest = self.issued.load(Ordering::SeqCst), "discarding stale complaints response");
        }
        metrics::counter!("civic_list_fetch_total", "outcome" => outcome.label()).increment(1);
        outcome
    }

    /// Refuse one complaint, then re-fetch with the same query.
    pub async fn refuse(&self, id: &str, query: &ListQuery) -> RefuseOutcome {
        match self.api.refuse(id).await {
            Ok(()) => {
                tracing::info!(complaint = id, "complaint refused");
                RefuseOutcome::Refused(self.fetch(query).await)
            }
            Err(err) => {
                tracing::error!(complaint = id, error = %err, "refusing complaint failed");
                self.alerts.alert(Alert::refuse_failed());
                RefuseOutcome::Failed
            }
        }
    }

    /// Supersede every in-flight fetch; their responses will be discarded.
    pub fn invalidate(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
        self.state.send_if_modified(|state| {
            let was_loading = state.loading;
            state.loading = false;
            was_loading
        });
    }

    /// Tear down: in-flight and future responses are all discarded.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.invalidate();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Sequence number of the most recently issued fetch.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    fn is_latest(&self, seq: u64) -> bool {
        !self.is_closed() && self.issued.load(Ordering::SeqCst) == seq
    }
}
