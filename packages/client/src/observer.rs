//! Observer surface consumed by the UI layer.
//!
//! Notifications are delivered synchronously on the controller's event
//! path. An observer that needs to hop to a UI thread does so itself;
//! [`ChannelObserver`] is the ready-made way to do that.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::ChatEvent;

/// Receives connection-state and message notifications.
///
/// Every method has a no-op default so observers implement only what they use.
/// Implementations must not block.
#[cfg_attr(test, mockall::automock)]
pub trait SessionObserver: Send + Sync {
    /// The current session finished its handshake
    fn on_connected(&self) {}

    /// An event was appended to the message log
    fn on_message_appended(&self, _event: &ChatEvent) {}

    /// The current session was closed or failed
    fn on_disconnected(&self) {}
}

/// A notification produced by the session state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Connected,
    MessageAppended(ChatEvent),
    Disconnected,
}

/// Identifies a subscription so it can be removed later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Registered observers, notified in subscription order
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<(ObserverId, Arc<dyn SessionObserver>)>,
    next_id: u64,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn SessionObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove a subscription; returns `false` if it was not registered
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver one notification to every observer
    pub fn notify(&self, notification: &Notification) {
        for (_, observer) in &self.observers {
            match notification {
                Notification::Connected => observer.on_connected(),
                Notification::MessageAppended(event) => observer.on_message_appended(event),
                Notification::Disconnected => observer.on_disconnected(),
            }
        }
    }
}

/// Observer that forwards notifications into a channel.
///
/// Lets a UI task consume notifications on its own schedule.
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelObserver {
    /// Create an observer and the receiver that yields its notifications
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn forward(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            tracing::debug!("Notification receiver dropped, discarding notification");
        }
    }
}

impl SessionObserver for ChannelObserver {
    fn on_connected(&self) {
        self.forward(Notification::Connected);
    }

    fn on_message_appended(&self, event: &ChatEvent) {
        self.forward(Notification::MessageAppended(event.clone()));
    }

    fn on_disconnected(&self) {
        self.forward(Notification::Disconnected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessagePayload, RoomId, Sender, Timestamp};
    use mockall::Sequence;

    fn create_event(payload: &str) -> ChatEvent {
        ChatEvent::message(
            MessagePayload::new(payload.to_string()).unwrap(),
            RoomId::new("general".to_string()).unwrap(),
            Sender::new("bob".to_string()).unwrap(),
            Timestamp::new(1000),
        )
    }

    #[test]
    fn test_notify_delivers_in_production_order() {
        // テスト項目: 各オブザーバーが通知を発生順に受け取る
        // given (前提条件):
        let mut seq = Sequence::new();
        let mut observer = MockSessionObserver::new();
        observer
            .expect_on_connected()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        observer
            .expect_on_message_appended()
            .withf(|event: &ChatEvent| event.payload.as_str() == "hi")
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        observer
            .expect_on_disconnected()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let mut registry = ObserverRegistry::new();
        registry.subscribe(Arc::new(observer));

        // when (操作):
        registry.notify(&Notification::Connected);
        registry.notify(&Notification::MessageAppended(create_event("hi")));
        registry.notify(&Notification::Disconnected);

        // then (期待する結果): モックの期待値はドロップ時に検証される
    }

    #[test]
    fn test_notify_reaches_every_observer() {
        // テスト項目: 複数のオブザーバー全てに通知が届く
        // given (前提条件):
        let (first, mut first_rx) = ChannelObserver::new();
        let (second, mut second_rx) = ChannelObserver::new();
        let mut registry = ObserverRegistry::new();
        registry.subscribe(Arc::new(first));
        registry.subscribe(Arc::new(second));

        // when (操作):
        registry.notify(&Notification::Connected);

        // then (期待する結果):
        assert_eq!(first_rx.try_recv().unwrap(), Notification::Connected);
        assert_eq!(second_rx.try_recv().unwrap(), Notification::Connected);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        // テスト項目: 購読解除したオブザーバーには通知が届かない
        // given (前提条件):
        let (observer, mut rx) = ChannelObserver::new();
        let mut registry = ObserverRegistry::new();
        let id = registry.subscribe(Arc::new(observer));

        // when (操作):
        let removed = registry.unsubscribe(id);
        registry.notify(&Notification::Disconnected);

        // then (期待する結果):
        assert!(removed);
        assert!(registry.is_empty());
        assert!(rx.try_recv().is_err());
        assert!(!registry.unsubscribe(id));
    }

    #[test]
    fn test_channel_observer_tolerates_dropped_receiver() {
        // テスト項目: 受信側がドロップされていても ChannelObserver はパニックしない
        // given (前提条件):
        let (observer, rx) = ChannelObserver::new();
        drop(rx);

        // when (操作):
        observer.on_message_appended(&create_event("hi"));

        // then (期待する結果): パニックせずに完了する
    }
}
