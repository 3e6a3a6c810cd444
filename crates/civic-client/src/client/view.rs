//! Complaints page: the composition of a list store, its query and a search form.
//!
//! # Key invariants
//! - A new filter or status always resets pagination to page 1.
//! - The latest query is published on a watch channel so realtime refreshes
//!   re-fetch with exactly what the operator is looking at.
use crate::alert::AlertSink;
use crate::api::ComplaintsApi;
use crate::client::query::{ListFilters, ListQuery};
use crate::client::search::SearchForm;
use crate::client::store::{FetchOutcome, FilteredListStore, ListState, RefuseOutcome};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

#[derive(Clone)]
pub struct ComplaintsView {
    store: Arc<FilteredListStore>,
    query: Arc<watch::Sender<ListQuery>>,
}

impl ComplaintsView {
    pub fn new(store: Arc<FilteredListStore>, status: impl Into<String>, page_size: u32) -> Self {
        let (query, _) = watch::channel(ListQuery::new(status, page_size));
        Self {
            store,
            query: Arc::new(query),
        }
    }

    pub fn with_api(
        api: Arc<dyn ComplaintsApi>,
        alerts: Arc<dyn AlertSink>,
        status: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self::new(
            Arc::new(FilteredListStore::new(api, alerts)),
            status,
            page_size,
        )
    }

    pub fn query(&self) -> ListQuery {
        self.query.borrow().clone()
    }

    pub fn watch_query(&self) -> watch::Receiver<ListQuery> {
        self.query.subscribe()
    }

    pub fn watch_state(&self) -> watch::Receiver<ListState> {
        self.store.subscribe()
    }

    pub fn state(&self) -> ListState {
        self.store.snapshot()
    }

    pub fn store(&self) -> &Arc<FilteredListStore> {
        &self.store
    }

    /// Install filters without fetching.
    pub fn apply_search(&self, filters: ListFilters) {
        self.query.send_modify(|query| query.apply_filters(filters));
    }

    pub async fn search(&self, filters: ListFilters) -> FetchOutcome {
        self.apply_search(filters);
        self.refresh().await
    }

    pub async fn go_to_page(&self, page: u32) -> FetchOutcome {
        self.query.send_modify(|query| query.set_page(page));
        self.refresh().await
    }

    pub async fn set_status(&self, status: impl Into<String>) -> FetchOutcome {
        let status = status.into();
        self.query.send_modify(|query| query.set_status(status));
        self.refresh().await
    }

    /// Re-fetch with the current query.
    pub async fn refresh(&self) -> FetchOutcome {
        let query = self.query();
        self.store.fetch(&query).await
    }

    pub async fn refuse(&self, id: &str) -> RefuseOutcome {
        let query = self.query();
        self.store.refuse(id, &query).await
    }

    /// Build a search form whose submissions are queued for [`ComplaintsView::run_searches`].
    pub fn search_form(&self) -> (SearchForm, mpsc::UnboundedReceiver<ListFilters>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let form = SearchForm::new(move |filters| {
            let _ = tx.send(filters);
        });
        (form, rx)
    }

    /// Apply queued form submissions in order until the form is dropped.
    pub async fn run_searches(&self, mut submissions: mpsc::UnboundedReceiver<ListFilters>) {
        while let Some(filters) = submissions.recv().await {
            self.search(filters).await;
        }
    }

    pub fn close(&self) {
        self.store.close();
    }
}
