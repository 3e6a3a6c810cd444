// User-facing alerts raised when a list operation fails.
use tokio::sync::mpsc;

pub const ALERT_TITLE: &str = "Erreur";
pub const FETCH_FAILED_MESSAGE: &str =
    "Une erreur est survenue lors du chargement des réclamations. Veuillez réessayer.";
pub const REFUSE_FAILED_MESSAGE: &str =
    "Impossible de refuser la réclamation. Veuillez réessayer.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    FetchFailed,
    RefuseFailed,
}

/// Modal alert shown to the operator. Messages are fixed per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: &'static str,
    pub message: &'static str,
}

impl Alert {
    pub fn fetch_failed() -> Self {
        Self {
            kind: AlertKind::FetchFailed,
            title: ALERT_TITLE,
            message: FETCH_FAILED_MESSAGE,
        }
    }

    pub fn refuse_failed() -> Self {
        Self {
            kind: AlertKind::RefuseFailed,
            title: ALERT_TITLE,
            message: REFUSE_FAILED_MESSAGE,
        }
    }
}

pub trait AlertSink: Send + Sync {
    fn alert(&self, alert: Alert);
}

/// Writes alerts to the log; used when no UI surface is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn alert(&self, alert: Alert) {
        tracing::warn!(kind = ?alert.kind, title = alert.title, "{}", alert.message);
    }
}

/// Forwards alerts to whatever renders them.
#[derive(Debug, Clone)]
pub struct ChannelAlertSink {
    tx: mpsc::UnboundedSender<Alert>,
}

impl ChannelAlertSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Alert>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AlertSink for ChannelAlertSink {
    fn alert(&self, alert: Alert) {
        // Receiver gone means the surface was torn down; nothing left to show.
        let _ = self.tx.send(alert);
    }
}
