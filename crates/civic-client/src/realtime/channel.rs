//! Owned push-notification connection.
//!
//! # Purpose
//! Keeps one websocket to the backend alive for as long as the handle lives,
//! reconnecting with exponential backoff, and fans events out to listeners.
//!
//! # How it fits
//! The composition root creates a [`PushChannel`] and passes it by reference to
//! views. Views obtain a [`NotificationSubscription`]; dropping it detaches the
//! listener, so listeners never accumulate across view transitions.
//!
//! # Concurrency + ordering guarantees
//! - One background task owns the socket; listeners receive events through a
//!   bounded broadcast channel.
//! - A listener that falls behind sees one [`PushEvent::Missed`] in place of
//!   the events it lost and those still buffered, so it refreshes once.
//! - After a reconnect listeners receive [`PushEvent::Reconnected`] because
//!   notifications sent while offline are lost.
use crate::config::ClientConfig;
use crate::realtime::backoff::Backoff;
use crate::realtime::frame::{CONNECT_FRAME, PONG_FRAME, PushFrame, decode_frame, socket_url};
use anyhow::{Result, anyhow};
use futures::{Sink, SinkExt, StreamExt};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

pub const NOTIFICATION_EVENT: &str = "notification";

// Engine.IO defaults, used until the open packet says otherwise.
const DEFAULT_PING_INTERVAL_MS: u64 = 25_000;
const DEFAULT_PING_TIMEOUT_MS: u64 = 20_000;
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// Named event emitted by the server.
    Named(String),
    /// The channel came back after losing its connection.
    Reconnected,
    /// The listener fell behind; this many events were collapsed into this one.
    Missed(u64),
}

impl PushEvent {
    pub fn triggers_refresh(&self) -> bool {
        match self {
            PushEvent::Named(name) => name == NOTIFICATION_EVENT,
            PushEvent::Reconnected | PushEvent::Missed(_) => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Reconnecting { attempt: u32, delay: Duration },
    Closed,
}

pub struct PushChannel {
    url: String,
    events: broadcast::Sender<PushEvent>,
    state: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PushChannel {
    /// Start the connection task. Must be called inside a Tokio runtime.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let url = socket_url(&config.push_url)?;
        let (events, _) = broadcast::channel(config.notification_buffer.max(1));
        let (state_tx, state) = watch::channel(ConnectionState::Connecting);
        let cancel = CancellationToken::new();
        let backoff = Backoff::new(config.reconnect_initial(), config.reconnect_max());
        let task = tokio::spawn(run_connection(
            url.clone(),
            events.clone(),
            state_tx,
            cancel.clone(),
            backoff,
        ));
        tracing::info!(%url, "push channel started");
        Ok(Self {
            url,
            events,
            state,
            cancel,
            task: Mutex::new(Some(task)),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn subscribe(&self) -> NotificationSubscription {
        NotificationSubscription {
            rx: self.events.subscribe(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Wait until the connection state satisfies `predicate`.
    pub async fn wait_for(&self, predicate: impl FnMut(&ConnectionState) -> bool) -> Result<ConnectionState> {
        let mut state = self.state.clone();
        let reached = state
            .wait_for(predicate)
            .await
            .map_err(|_| anyhow!("push channel task exited"))?;
        Ok(*reached)
    }

    /// Close the socket and stop reconnecting.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "push channel task ended abnormally");
            }
        }
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// One listener on a [`PushChannel`]. Dropping it detaches the listener.
pub struct NotificationSubscription {
    rx: broadcast::Receiver<PushEvent>,
}

impl NotificationSubscription {
    /// Next raw event; `None` once the channel is gone.
    pub async fn recv(&mut self) -> Option<PushEvent> {
        match self.rx.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                let missed = skipped.saturating_add(self.drain());
                tracing::debug!(skipped, missed, "push listener lagged");
                Some(PushEvent::Missed(missed))
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    // Discard everything already buffered; one refresh covers it all.
    fn drain(&mut self) -> u64 {
        let mut drained = 0u64;
        loop {
            match self.rx.try_recv() {
                Ok(_) => drained += 1,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    drained = drained.saturating_add(skipped);
                }
                Err(_) => return drained,
            }
        }
    }

    /// Wait for the next event that should trigger a list refresh.
    pub async fn next_refresh(&mut self) -> Option<PushEvent> {
        while let Some(event) = self.recv().await {
            if event.triggers_refresh() {
                return Some(event);
            }
        }
        None
    }
}

async fn run_connection(
    url: String,
    events: broadcast::Sender<PushEvent>,
    state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    mut backoff: Backoff,
) {
    let mut ever_connected = false;
    loop {
        let attempt = tokio::select! {
            _ = cancel.cancelled() => break,
            attempt = tokio_tungstenite::connect_async(url.as_str()) => attempt,
        };
        match attempt {
            Ok((socket, _)) => {
                let result =
                    run_session(socket, &events, &state, &cancel, &mut backoff, &mut ever_connected)
                        .await;
                if let Err(err) = result {
                    tracing::warn!(error = %err, "push channel session ended");
                }
            }
            Err(err) => {
                tracing::warn!(%url, error = %err, "push channel connect failed");
            }
        }
        if cancel.is_cancelled() {
            break;
        }

        let delay = backoff.next_delay();
        let _ = state.send(ConnectionState::Reconnecting {
            attempt: backoff.attempt(),
            delay,
        });
        metrics::counter!("civic_realtime_reconnects_total").increment(1);
        tracing::info!(attempt = backoff.attempt(), delay_ms = delay.as_millis() as u64, "push channel reconnecting");
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }
    let _ = state.send(ConnectionState::Closed);
    tracing::info!("push channel closed");
}

type Socket = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

// Returns Ok(()) only when cancelled; any other end of the session is an error
// so the caller schedules a reconnect.
async fn run_session(
    socket: Socket,
    events: &broadcast::Sender<PushEvent>,
    state: &watch::Sender<ConnectionState>,
    cancel: &CancellationToken,
    backoff: &mut Backoff,
    ever_connected: &mut bool,
) -> Result<()> {
    let was_connected = *ever_connected;
    let (mut sink, mut stream) = socket.split();
    let mut heartbeat = heartbeat_deadline(None, None);
    loop {
        let message = tokio::select! {
            _ = cancel.cancelled() => {
                if !send_close(&mut sink, CLOSE_TIMEOUT).await {
                    tracing::debug!("push channel close frame not delivered");
                }
                return Ok(());
            }
            message = tokio::time::timeout(heartbeat, stream.next()) => message.map_err(|_| {
                anyhow!("push channel silent for {}ms", heartbeat.as_millis())
            })?,
        };
        let text = match message {
            None => return Err(anyhow!("push channel closed by server")),
            Some(Err(err)) => return Err(err.into()),
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) => return Err(anyhow!("push channel close frame received")),
            Some(Ok(_)) => continue,
        };
        match decode_frame(&text) {
            Some(PushFrame::Open {
                sid,
                ping_interval_ms,
                ping_timeout_ms,
            }) => {
                heartbeat = heartbeat_deadline(ping_interval_ms, ping_timeout_ms);
                tracing::debug!(
                    sid = sid.as_deref().unwrap_or(""),
                    heartbeat_ms = heartbeat.as_millis() as u64,
                    "push channel open"
                );
                sink.send(Message::Text(CONNECT_FRAME.to_string())).await?;
            }
            Some(PushFrame::Ping) => {
                sink.send(Message::Text(PONG_FRAME.to_string())).await?;
            }
            Some(PushFrame::Connected) => {
                backoff.reset();
                *ever_connected = true;
                let _ = state.send(ConnectionState::Connected);
                tracing::info!("push channel connected");
                if was_connected {
                    let _ = events.send(PushEvent::Reconnected);
                }
            }
            Some(PushFrame::Event { name }) => {
                metrics::counter!("civic_realtime_notifications_total").increment(1);
                tracing::debug!(event = %name, listeners = events.receiver_count(), "push event");
                // No listeners is fine: nobody is looking at a list right now.
                let _ = events.send(PushEvent::Named(name));
            }
            Some(PushFrame::Close) | Some(PushFrame::Disconnected) => {
                return Err(anyhow!("push channel disconnected by server"));
            }
            Some(PushFrame::ConnectError(message)) => {
                return Err(anyhow!("push channel connect rejected: {message}"));
            }
            Some(PushFrame::Pong) | Some(PushFrame::Noop) | None => {}
        }
    }
}

// The server pings every `pingInterval` and waits `pingTimeout` for the pong,
// so a live connection never goes longer than their sum without a frame.
fn heartbeat_deadline(ping_interval_ms: Option<u64>, ping_timeout_ms: Option<u64>) -> Duration {
    let interval = ping_interval_ms.unwrap_or(DEFAULT_PING_INTERVAL_MS);
    let timeout = ping_timeout_ms.unwrap_or(DEFAULT_PING_TIMEOUT_MS);
    Duration::from_millis(interval.saturating_add(timeout).max(1))
}

async fn send_close<S>(sink: &mut S, limit: Duration) -> bool
where
    S: Sink<Message> + Unpin,
{
    matches!(
        tokio::time::timeout(limit, sink.send(Message::Close(None))).await,
        Ok(Ok(()))
    )
}
