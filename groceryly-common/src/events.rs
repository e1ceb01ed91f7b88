//! Change-notification events between views of the same session
//!
//! Replaces the storage-event signaling of earlier revisions with an
//! explicit in-process pub/sub: any view holding a subscription learns
//! that a category changed and can re-render from the mirror.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::{Category, UserId};

/// Events published by the synchronization core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ListEvent {
    /// A category's contents changed for the given user
    ListChanged {
        user_id: UserId,
        category: Category,
        timestamp: DateTime<Utc>,
    },

    /// A new session replaced the previous one; all mirrors were discarded
    UserSwitched {
        user_id: UserId,
        timestamp: DateTime<Utc>,
    },
}

impl ListEvent {
    pub fn list_changed(user_id: UserId, category: Category) -> Self {
        ListEvent::ListChanged {
            user_id,
            category,
            timestamp: Utc::now(),
        }
    }

    pub fn user_switched(user_id: UserId) -> Self {
        ListEvent::UserSwitched {
            user_id,
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast bus distributing [`ListEvent`]s to subscribed views
///
/// Backed by `tokio::sync::broadcast`: publishing never blocks, slow
/// subscribers lag rather than stall producers, and receivers clean up
/// when dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ListEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; having no subscribers is not an error
    pub fn emit_lossy(&self, event: ListEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let event = ListEvent::list_changed(UserId::new("u1"), Category::Grocery);
        bus.emit_lossy(event.clone());

        let received = rx.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[test]
    fn emit_without_subscribers_is_fine() {
        let bus = EventBus::default();
        bus.emit_lossy(ListEvent::user_switched(UserId::new("u1")));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn each_subscriber_sees_every_event() {
        let bus = EventBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.emit_lossy(ListEvent::list_changed(UserId::new("u1"), Category::Pantry));

        assert!(matches!(
            a.recv().await.unwrap(),
            ListEvent::ListChanged { category: Category::Pantry, .. }
        ));
        assert!(matches!(
            b.recv().await.unwrap(),
            ListEvent::ListChanged { category: Category::Pantry, .. }
        ));
    }
}
