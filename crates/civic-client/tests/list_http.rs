//! End-to-end tests for the filtered list store over HTTP.
//!
//! # Key invariants
//! - Query parameters carry status, skip, limit and empty-string filters.
//! - Failures keep the last good page and raise exactly one alert.
//! - Refusing re-fetches once with the original query.
mod common;

use civic_client::{
    AlertKind, ChannelAlertSink, ClientConfig, ComplaintsView, FetchOutcome, HttpComplaintsApi,
    ListFilters, RefuseOutcome,
};
use common::{MockBackend, serve_api};
use std::sync::Arc;
use std::sync::atomic::Ordering;

fn config_for(addr: std::net::SocketAddr) -> ClientConfig {
    let mut config = ClientConfig::local_defaults();
    config.api_url = format!("http://{addr}");
    config.request_timeout_ms = 2_000;
    config
}

#[tokio::test]
async fn fetch_first_page_of_waiting_complaints() {
    let backend = Arc::new(MockBackend::default());
    let addr = serve_api(backend.clone()).await;
    let config = config_for(addr);
    let api = Arc::new(HttpComplaintsApi::new(&config).expect("api"));
    let (alerts, _rx) = ChannelAlertSink::new();
    let view = ComplaintsView::with_api(api, Arc::new(alerts), "waiting", config.page_size);

    assert_eq!(view.refresh().await, FetchOutcome::Applied);

    let state = view.state();
    assert_eq!(state.result.items.len(), 3);
    assert_eq!(state.result.total_count, 3);
    assert_eq!(state.result.total_for_status, 3);

    let query = backend.last_query();
    assert_eq!(query.get("status").map(String::as_str), Some("waiting"));
    assert_eq!(query.get("skip").map(String::as_str), Some("0"));
    assert_eq!(query.get("limit").map(String::as_str), Some("5"));
    assert_eq!(query.get("name").map(String::as_str), Some(""));
    assert_eq!(query.get("date").map(String::as_str), Some(""));
    assert_eq!(backend.authorization.lock()[0], None);
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let backend = Arc::new(MockBackend::default());
    let addr = serve_api(backend.clone()).await;
    let mut config = config_for(addr);
    config.access_token = Some("t0k3n".to_string());
    let api = Arc::new(HttpComplaintsApi::new(&config).expect("api"));
    let (alerts, _rx) = ChannelAlertSink::new();
    let view = ComplaintsView::with_api(api, Arc::new(alerts), "waiting", 5);

    view.refresh().await;
    assert_eq!(
        backend.authorization.lock()[0].as_deref(),
        Some("Bearer t0k3n")
    );
}

#[tokio::test]
async fn server_error_keeps_previous_page() {
    let backend = Arc::new(MockBackend::default());
    let addr = serve_api(backend.clone()).await;
    let config = config_for(addr);
    let api = Arc::new(HttpComplaintsApi::new(&config).expect("api"));
    let (alerts, mut alert_rx) = ChannelAlertSink::new();
    let view = ComplaintsView::with_api(api, Arc::new(alerts), "waiting", 5);

    view.refresh().await;
    backend.set_fail_list(true);
    assert_eq!(view.go_to_page(2).await, FetchOutcome::Failed);

    let state = view.state();
    assert_eq!(state.result.items[0].id, "c1");
    assert!(state.last_error.is_some());
    assert_eq!(alert_rx.try_recv().expect("alert").kind, AlertKind::FetchFailed);
    assert!(alert_rx.try_recv().is_err());
}

#[tokio::test]
async fn unreachable_backend_degrades_without_panicking() {
    // Bind then drop a listener so the port is known to be closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let api = Arc::new(HttpComplaintsApi::new(&config_for(addr)).expect("api"));
    let (alerts, mut alert_rx) = ChannelAlertSink::new();
    let view = ComplaintsView::with_api(api, Arc::new(alerts), "waiting", 5);

    assert_eq!(view.refresh().await, FetchOutcome::Failed);
    assert!(view.state().result.items.is_empty());
    assert!(alert_rx.try_recv().is_ok());
}

#[tokio::test]
async fn refuse_then_refetch_with_original_filters() {
    let backend = Arc::new(MockBackend::default());
    let addr = serve_api(backend.clone()).await;
    let api = Arc::new(HttpComplaintsApi::new(&config_for(addr)).expect("api"));
    let (alerts, _rx) = ChannelAlertSink::new();
    let view = ComplaintsView::with_api(api, Arc::new(alerts), "waiting", 5);

    view.search(ListFilters::new("Ali", "2024-05-01")).await;
    view.go_to_page(2).await;
    let before = backend.list_calls();

    let outcome = view.refuse("c7").await;
    assert_eq!(outcome, RefuseOutcome::Refused(FetchOutcome::Applied));
    assert_eq!(backend.refused.lock().as_slice(), &["c7".to_string()]);
    assert_eq!(backend.list_calls(), before + 1);

    let query = backend.last_query();
    assert_eq!(query.get("name").map(String::as_str), Some("Ali"));
    assert_eq!(query.get("date").map(String::as_str), Some("2024-05-01"));
    assert_eq!(query.get("skip").map(String::as_str), Some("5"));
}

#[tokio::test]
async fn failed_refuse_does_not_refetch() {
    let backend = Arc::new(MockBackend::default());
    backend.fail_refuse.store(true, Ordering::SeqCst);
    let addr = serve_api(backend.clone()).await;
    let api = Arc::new(HttpComplaintsApi::new(&config_for(addr)).expect("api"));
    let (alerts, mut alert_rx) = ChannelAlertSink::new();
    let view = ComplaintsView::with_api(api, Arc::new(alerts), "waiting", 5);

    assert_eq!(view.refuse("missing").await, RefuseOutcome::Failed);
    assert_eq!(backend.list_calls(), 0);
    assert_eq!(alert_rx.try_recv().expect("alert").kind, AlertKind::RefuseFailed);
}

#[tokio::test]
async fn refuse_sends_id_as_one_path_segment() {
    let backend = Arc::new(MockBackend::default());
    let addr = serve_api(backend.clone()).await;
    let api = Arc::new(HttpComplaintsApi::new(&config_for(addr)).expect("api"));
    let (alerts, _rx) = ChannelAlertSink::new();
    let view = ComplaintsView::with_api(api, Arc::new(alerts), "waiting", 5);

    let outcome = view.refuse("a/b?c#d").await;
    assert_eq!(outcome, RefuseOutcome::Refused(FetchOutcome::Applied));
    assert_eq!(backend.refused.lock().as_slice(), &["a/b?c#d".to_string()]);
}
