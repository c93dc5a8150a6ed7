//! Event sink that bridges the pipeline to the observer servers.
//!
//! Every emitted event is published into the [`BroadcastHub`], which records
//! it in the event history and queues it for each push subscriber.
//!
//! [`BroadcastHub`]: palwatch_observer::hub::BroadcastHub

use std::sync::Arc;

use palwatch_core::sink::EventSink;
use palwatch_observer::state::AppState;
use palwatch_types::Event;
use tracing::debug;

/// Sink that bridges the pipeline to the observer state.
pub struct ObserverSink {
    state: Arc<AppState>,
}

impl ObserverSink {
    /// Create a sink publishing into `state`.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl EventSink for ObserverSink {
    async fn emit(&self, event: Event) {
        let kind = event.kind();
        let delivered = self.state.hub.publish(event).await;
        debug!(kind, delivered, "event published");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use chrono::Utc;
    use palwatch_core::config::HistoryConfig;
    use palwatch_types::{FileChangedEvent, FileRole, PushMessage};

    use super::*;

    #[tokio::test]
    async fn emitted_events_reach_history_and_subscribers() {
        let state = Arc::new(AppState::new(PathBuf::from("/saves"), &HistoryConfig::default()));
        let sink = ObserverSink::new(Arc::clone(&state));
        let mut sub = state.hub.subscribe().await;

        sink.emit(FileChangedEvent::changed("LocalData.sav", FileRole::Local, Utc::now()).into())
            .await;

        assert_eq!(state.history.len().await, 1);
        assert!(matches!(sub.rx.recv().await.unwrap(), PushMessage::Greeting(_)));
        assert!(matches!(sub.rx.recv().await.unwrap(), PushMessage::FileChanged(_)));
    }
}
