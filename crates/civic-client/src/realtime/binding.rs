// Ties a push subscription to a complaints view for the view's lifetime.
use crate::client::view::ComplaintsView;
use crate::realtime::channel::{NotificationSubscription, PushChannel};
use tokio::task::JoinHandle;

/// Re-fetches a view whenever a refresh-worthy push event arrives.
///
/// Refreshes run one at a time with the view's latest query. Dropping the
/// binding (or calling [`RefreshBinding::detach`]) stops the task and releases
/// the listener.
pub struct RefreshBinding {
    task: JoinHandle<()>,
}

impl RefreshBinding {
    pub fn attach(view: ComplaintsView, mut subscription: NotificationSubscription) -> Self {
        let task = tokio::spawn(async move {
            while let Some(event) = subscription.next_refresh().await {
                let outcome = view.refresh().await;
                tracing::debug!(?event, ?outcome, "realtime refresh");
            }
        });
        Self { task }
    }

    pub fn bind(view: &ComplaintsView, channel: &PushChannel) -> Self {
        Self::attach(view.clone(), channel.subscribe())
    }

    pub fn is_attached(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn detach(self) {
        self.task.abort();
    }
}

impl Drop for RefreshBinding {
    fn drop(&mut self) {
        self.task.abort();
    }
}
