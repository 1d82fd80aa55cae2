//! Broadcast channel for dashboard events.
//!
//! The orchestrator publishes one [`DashboardEvent::SlotUpdated`] per slot
//! write, toggles [`DashboardEvent::Loading`] around a full refresh, and
//! raises [`DashboardEvent::Notification`] for transient toasts. Renderers
//! subscribe and pull slot contents when told a slot changed.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::slots::SlotId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// Full-refresh loading indicator.
    Loading(bool),
    SlotUpdated(SlotId),
    Notification(Notification),
}

/// Broadcast bus for [`DashboardEvent`]s.
///
/// When the ring buffer is full, the oldest events are dropped for lagging
/// receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event and returns the number of receivers that got it.
    /// With no receivers the event is dropped.
    pub fn publish(&self, event: DashboardEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(8);
        assert_eq!(bus.publish(DashboardEvent::Loading(true)), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(DashboardEvent::Loading(true));
        bus.publish(DashboardEvent::SlotUpdated(SlotId::Tiles));
        bus.publish(DashboardEvent::Notification(Notification::error("boom")));

        assert_eq!(rx.recv().await.unwrap(), DashboardEvent::Loading(true));
        assert_eq!(
            rx.recv().await.unwrap(),
            DashboardEvent::SlotUpdated(SlotId::Tiles)
        );
        let DashboardEvent::Notification(note) = rx.recv().await.unwrap() else {
            panic!("expected a notification");
        };
        assert_eq!(note.level, NotificationLevel::Error);
    }

    #[test]
    fn zero_capacity_is_bumped() {
        let bus = EventBus::new(0);
        let _rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
    }
}
