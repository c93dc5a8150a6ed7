//! Fan-out of emitted events to push subscribers.
//!
//! Each subscriber owns a bounded queue drained by its `WebSocket` task.
//! [`BroadcastHub::publish`] only ever uses `try_send`, so delivery never
//! waits on a client: a full queue skips the event for that subscriber and
//! a closed queue drops the subscriber.
//!
//! `subscribe` and `publish` hold the same lock while touching history, so
//! a new subscriber's greeting and the live stream that follows it neither
//! overlap nor leave a gap.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use palwatch_core::history::EventHistory;
use palwatch_core::world::WorldStateStore;
use palwatch_types::{Event, Greeting, PushMessage, SubscriberId};
use tokio::sync::{Mutex, mpsc};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// A registered push subscriber.
#[derive(Debug)]
pub struct Subscription {
    /// Identifier used to unsubscribe.
    pub id: SubscriberId,
    /// Outbound messages, greeting first.
    pub rx: mpsc::Receiver<PushMessage>,
}

/// Registry of push subscribers plus the history and world views used to
/// greet them.
pub struct BroadcastHub {
    world: Arc<WorldStateStore>,
    history: Arc<EventHistory>,
    greeting_events: usize,
    backlog: usize,
    subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<PushMessage>>>,
}

impl BroadcastHub {
    /// Create a hub with no subscribers.
    ///
    /// `backlog` is the per-subscriber queue length (minimum 1).
    pub fn new(
        world: Arc<WorldStateStore>,
        history: Arc<EventHistory>,
        greeting_events: usize,
        backlog: usize,
    ) -> Self {
        Self {
            world,
            history,
            greeting_events,
            backlog: backlog.max(1),
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// Register a subscriber and queue its greeting.
    pub async fn subscribe(&self) -> Subscription {
        let mut subscribers = self.subscribers.lock().await;

        let greeting = Greeting::new(
            self.world.get().await,
            self.history.recent(self.greeting_events).await,
            Utc::now(),
        );
        let (tx, rx) = mpsc::channel(self.backlog);
        let id = SubscriberId::new();
        if tx.try_send(PushMessage::Greeting(greeting)).is_err() {
            warn!(subscriber = %id, "failed to queue greeting");
        }
        subscribers.insert(id, tx);

        debug!(
            subscriber = %id,
            subscribers = subscribers.len(),
            "subscriber registered"
        );
        Subscription { id, rx }
    }

    /// Record `event` in history and offer it to every subscriber.
    ///
    /// Returns how many subscribers had it queued.
    pub async fn publish(&self, event: Event) -> usize {
        let mut subscribers = self.subscribers.lock().await;
        self.history.push(event.clone()).await;

        let message = PushMessage::from(event);
        let mut delivered: usize = 0;
        subscribers.retain(|id, tx| match tx.try_send(message.clone()) {
            Ok(()) => {
                delivered = delivered.saturating_add(1);
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(subscriber = %id, "subscriber queue full, skipping event");
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!(subscriber = %id, "dropping closed subscriber");
                false
            }
        });
        delivered
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.lock().await.remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, "subscriber removed");
        }
        removed
    }

    /// Number of registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use palwatch_types::{FileChangedEvent, FileRole, GameEvent, WorldState};

    use super::*;

    fn hub(backlog: usize) -> BroadcastHub {
        BroadcastHub::new(
            Arc::new(WorldStateStore::new()),
            Arc::new(EventHistory::new(100)),
            10,
            backlog,
        )
    }

    fn changed(name: &str) -> Event {
        FileChangedEvent::changed(name, FileRole::Local, Utc::now()).into()
    }

    fn greeting(rx: &mut mpsc::Receiver<PushMessage>) -> Greeting {
        match rx.try_recv().unwrap() {
            PushMessage::Greeting(g) => g,
            other => panic!("expected greeting, got {other:?}"),
        }
    }

    fn file_of(message: PushMessage) -> String {
        match message {
            PushMessage::FileChanged(f) => f.file,
            other => panic!("expected file_changed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_still_records_history() {
        let hub = hub(8);
        assert_eq!(hub.publish(changed("a.sav")).await, 0);
        assert_eq!(hub.history.len().await, 1);
    }

    #[tokio::test]
    async fn two_subscribers_both_get_greeting_then_event() {
        let hub = hub(8);
        let mut first = hub.subscribe().await;
        let mut second = hub.subscribe().await;
        assert_eq!(hub.subscriber_count().await, 2);

        let event: Event = GameEvent::world_saved(WorldState::default(), Utc::now()).into();
        assert_eq!(hub.publish(event).await, 2);

        for sub in [&mut first, &mut second] {
            let greeting = greeting(&mut sub.rx);
            assert!(greeting.recent_events.is_empty());
            match sub.rx.try_recv().unwrap() {
                PushMessage::GameEvent(g) => assert_eq!(g.event_type, "world_saved"),
                other => panic!("expected game_event, got {other:?}"),
            }
            assert!(sub.rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn disconnected_subscriber_misses_later_events() {
        let hub = hub(8);
        let first = hub.subscribe().await;
        let mut second = hub.subscribe().await;
        greeting(&mut second.rx);

        hub.unsubscribe(first.id).await;
        assert_eq!(hub.publish(changed("a.sav")).await, 1);
        assert_eq!(file_of(second.rx.try_recv().unwrap()), "a.sav");
    }

    #[tokio::test]
    async fn greeting_carries_state_and_most_recent_events() {
        let world = Arc::new(WorldStateStore::new());
        let hub = BroadcastHub::new(Arc::clone(&world), Arc::new(EventHistory::new(100)), 3, 8);
        world
            .replace(WorldState {
                pal_count: 7,
                ..WorldState::default()
            })
            .await;
        for n in 0..5 {
            hub.publish(changed(&format!("{n}.sav"))).await;
        }

        let mut sub = hub.subscribe().await;
        let greeting = greeting(&mut sub.rx);

        assert_eq!(greeting.world_state.pal_count, 7);
        let files: Vec<&str> = greeting
            .recent_events
            .iter()
            .map(|e| match e {
                Event::FileChanged(f) => f.file.as_str(),
                Event::GameEvent(_) => "game",
            })
            .collect();
        assert_eq!(files, vec!["4.sav", "3.sav", "2.sav"]);
    }

    #[tokio::test]
    async fn greeting_and_live_stream_do_not_overlap() {
        let hub = Arc::new(hub(64));
        let publisher = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                for n in 0..50 {
                    hub.publish(changed(&format!("{n}.sav"))).await;
                    tokio::task::yield_now().await;
                }
            })
        };
        tokio::task::yield_now().await;
        let mut sub = hub.subscribe().await;
        publisher.await.unwrap();

        let greeted: Vec<String> = greeting(&mut sub.rx)
            .recent_events
            .into_iter()
            .map(|e| match e {
                Event::FileChanged(f) => f.file,
                Event::GameEvent(_) => String::new(),
            })
            .collect();
        let mut live = Vec::new();
        while let Ok(message) = sub.rx.try_recv() {
            live.push(file_of(message));
        }

        assert!(greeted.iter().all(|f| !live.contains(f)));
        // The live stream picks up exactly where the history left off.
        if let (Some(newest_greeted), Some(first_live)) = (greeted.first(), live.first()) {
            let a: usize = newest_greeted.trim_end_matches(".sav").parse().unwrap();
            let b: usize = first_live.trim_end_matches(".sav").parse().unwrap();
            assert_eq!(a.saturating_add(1), b);
        }
    }

    #[tokio::test]
    async fn full_queue_skips_event_for_that_subscriber_only() {
        let hub = hub(1);
        let mut stalled = hub.subscribe().await;
        let mut healthy = hub.subscribe().await;
        // Healthy subscriber drains its greeting; the stalled one never reads.
        greeting(&mut healthy.rx);

        assert_eq!(hub.publish(changed("a.sav")).await, 1);
        assert_eq!(file_of(healthy.rx.try_recv().unwrap()), "a.sav");
        assert_eq!(hub.subscriber_count().await, 2);

        greeting(&mut stalled.rx);
        assert!(stalled.rx.try_recv().is_err());
        assert_eq!(hub.publish(changed("b.sav")).await, 2);
        assert_eq!(file_of(stalled.rx.try_recv().unwrap()), "b.sav");
    }

    #[tokio::test]
    async fn closed_subscribers_are_dropped_on_publish() {
        let hub = hub(8);
        let sub = hub.subscribe().await;
        let _kept = hub.subscribe().await;
        drop(sub.rx);

        assert_eq!(hub.publish(changed("a.sav")).await, 1);
        assert_eq!(hub.subscriber_count().await, 1);
    }

    #[tokio::test]
    async fn unsubscribe_removes_once() {
        let hub = hub(8);
        let sub = hub.subscribe().await;
        assert!(hub.unsubscribe(sub.id).await);
        assert!(!hub.unsubscribe(sub.id).await);
        assert_eq!(hub.subscriber_count().await, 0);
    }
}
