//! Typed event bus between the host and the tracker
//!
//! Events travel over a bounded tokio channel to a single consumer, so
//! the order in which the host reports them (for example activation then
//! removal of the same tab) is the order in which they are applied. A host
//! restart travels on the same channel so it is handled in sequence too.

use crate::JanitorError;
use tabsweep_domain::{Resource, ResourceId};
use tokio::sync::mpsc;

/// Lifecycle event reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEvent {
    /// A tab was opened
    Created(Resource),

    /// A tab became the active tab of its window
    Activated(ResourceId),

    /// A tab was closed
    Removed(ResourceId),
}

impl TabEvent {
    /// Id of the tab the event is about
    pub fn resource_id(&self) -> &ResourceId {
        match self {
            TabEvent::Created(resource) => &resource.id,
            TabEvent::Activated(id) | TabEvent::Removed(id) => id,
        }
    }
}

/// Anything the host can put on the event channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A tab lifecycle event for the tracker
    Tab(TabEvent),

    /// The host restarted; the worker recovers its sweep job
    Restarted,
}

impl From<TabEvent> for HostEvent {
    fn from(event: TabEvent) -> Self {
        HostEvent::Tab(event)
    }
}

/// Producer half handed to the host
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<HostEvent>,
}

impl EventSender {
    /// Queue an event, waiting for capacity
    pub async fn send(&self, event: impl Into<HostEvent>) -> Result<(), JanitorError> {
        self.tx
            .send(event.into())
            .await
            .map_err(|_| JanitorError::Worker("event consumer has stopped".to_string()))
    }

    /// Queue an event from a thread outside the runtime
    ///
    /// # Panics
    ///
    /// Panics if called from within an async context.
    pub fn blocking_send(&self, event: impl Into<HostEvent>) -> Result<(), JanitorError> {
        self.tx
            .blocking_send(event.into())
            .map_err(|_| JanitorError::Worker("event consumer has stopped".to_string()))
    }

    /// Report a newly opened tab
    pub async fn created(&self, resource: Resource) -> Result<(), JanitorError> {
        self.send(TabEvent::Created(resource)).await
    }

    /// Report an activation
    pub async fn activated(&self, id: ResourceId) -> Result<(), JanitorError> {
        self.send(TabEvent::Activated(id)).await
    }

    /// Report a closed tab
    pub async fn removed(&self, id: ResourceId) -> Result<(), JanitorError> {
        self.send(TabEvent::Removed(id)).await
    }

    /// Report a host restart
    pub async fn restarted(&self) -> Result<(), JanitorError> {
        self.send(HostEvent::Restarted).await
    }
}

/// Create a bounded event channel
pub fn event_channel(capacity: usize) -> (EventSender, mpsc::Receiver<HostEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (sender, mut rx) = event_channel(8);
        let id = ResourceId::new("1");

        sender.created(Resource::new("1", "https://a.test")).await.unwrap();
        sender.activated(id.clone()).await.unwrap();
        sender.removed(id.clone()).await.unwrap();
        sender.restarted().await.unwrap();
        drop(sender);

        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push(event);
        }

        assert_eq!(received.len(), 4);
        assert!(matches!(received[0], HostEvent::Tab(TabEvent::Created(_))));
        assert_eq!(received[1], HostEvent::Tab(TabEvent::Activated(id.clone())));
        assert_eq!(received[2], HostEvent::Tab(TabEvent::Removed(id.clone())));
        assert_eq!(received[3], HostEvent::Restarted);
        assert!(received[..3].iter().all(|e| match e {
            HostEvent::Tab(tab) => tab.resource_id() == &id,
            HostEvent::Restarted => false,
        }));
    }

    #[test]
    fn test_blocking_send_from_plain_thread() {
        let (sender, mut rx) = event_channel(4);
        std::thread::spawn(move || {
            sender.blocking_send(TabEvent::Removed(ResourceId::new("9"))).unwrap();
        })
        .join()
        .unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            HostEvent::Tab(TabEvent::Removed(ResourceId::new("9")))
        );
    }

    #[tokio::test]
    async fn test_send_after_consumer_dropped() {
        let (sender, rx) = event_channel(1);
        drop(rx);
        let result = sender.removed(ResourceId::new("1")).await;
        assert!(matches!(result, Err(JanitorError::Worker(_))));
    }
}
