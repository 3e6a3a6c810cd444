//! Complaint list watcher entry point.
//!
//! # Purpose
//! Composition root for the client library: loads configuration, builds the
//! HTTP API client, the complaints view and the push channel, then keeps the
//! chosen list page fresh until Ctrl-C.
//!
//! # Notes
//! `run_with_shutdown` takes the shutdown signal as a future so tests can stop
//! the watcher without sending signals.
mod config;
mod observability;

use anyhow::Context;
use civic_client::{
    ComplaintsView, HttpComplaintsApi, ListFilters, ListState, LogAlertSink, PushChannel,
    RefreshBinding,
};
use clap::Parser;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};

#[derive(Parser, Debug)]
#[command(name = "civic-watch")]
#[command(about = "Follow a filtered complaint list and refresh it on push notifications")]
struct Args {
    /// Complaint status to list
    #[arg(long, env = "CIVIC_WATCH_STATUS", default_value = "waiting")]
    status: String,

    /// Filter on the citizen name (empty = all)
    #[arg(long, default_value = "")]
    name: String,

    /// Filter on the creation date (empty = all)
    #[arg(long, default_value = "")]
    date: String,

    /// Page to display, starting at 1
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// YAML file overriding the client configuration
    #[arg(long)]
    config: Option<String>,
}

/// What the watcher shows.
#[derive(Debug, Clone)]
struct WatchRequest {
    status: String,
    filters: ListFilters,
    page: u32,
}

impl From<Args> for WatchRequest {
    fn from(args: Args) -> Self {
        Self {
            status: args.status,
            filters: ListFilters::new(args.name, args.date),
            page: args.page,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    observability::init_logging();
    let config = config::WatchConfig::load(args.config.as_deref()).context("load watch config")?;
    run_with_shutdown(config, args.into(), async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(
    config: config::WatchConfig,
    request: WatchRequest,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics = config.metrics_bind.map(|addr| {
        let handle = observability::install_metrics_recorder();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let stop = async move {
                let _ = stop_rx.await;
            };
            if let Err(err) = observability::serve_metrics(handle, addr, stop).await {
                tracing::warn!(%addr, error = %err, "metrics endpoint failed");
            }
        });
        (stop_tx, task)
    });

    let api = Arc::new(HttpComplaintsApi::new(&config.client).context("build complaints api client")?);
    let view = ComplaintsView::with_api(
        api,
        Arc::new(LogAlertSink),
        request.status.clone(),
        config.client.page_size,
    );
    view.apply_search(request.filters.clone());
    let channel = PushChannel::connect(&config.client).context("open push channel")?;
    let binding = RefreshBinding::bind(&view, &channel);
    let reporter = tokio::spawn(report_results(view.watch_state()));
    tracing::info!(
        status = %request.status,
        name = %request.filters.name,
        date = %request.filters.date,
        page = request.page,
        push_url = %channel.url(),
        "watching complaints"
    );

    tokio::pin!(shutdown);
    let stopped_early = tokio::select! {
        outcome = view.go_to_page(request.page) => {
            tracing::info!(?outcome, "initial fetch finished");
            false
        }
        _ = &mut shutdown => true,
    };
    if !stopped_early {
        shutdown.await;
    }

    tracing::info!("shutting down");
    binding.detach();
    channel.shutdown().await;
    view.close();
    reporter.abort();
    let _ = reporter.await;
    if let Some((stop_tx, task)) = metrics {
        let _ = stop_tx.send(());
        let _ = task.await;
    }
    Ok(())
}

async fn report_results(mut state: watch::Receiver<ListState>) {
    while state.changed().await.is_ok() {
        let snapshot = state.borrow_and_update().clone();
        if !snapshot.loading {
            log_state(&snapshot);
        }
    }
}

fn log_state(state: &ListState) {
    if let Some(err) = &state.last_error {
        tracing::warn!(
            error = %err,
            shown = state.result.items.len(),
            "list fetch failed, showing previous page"
        );
        return;
    }
    tracing::info!(
        shown = state.result.items.len(),
        total = state.result.total_count,
        total_for_status = state.result.total_for_status,
        "complaint list updated"
    );
    for complaint in &state.result.items {
        tracing::debug!(
            id = %complaint.id,
            title = complaint.title.as_deref().unwrap_or(""),
            status = complaint.status.as_deref().unwrap_or(""),
            "complaint"
        );
    }
}
