//! In-process event feed: the interface a presentation layer subscribes to.

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use rumble_types::{events::EventKind, events::SystemEvent, Result, RumbleError};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;

#[async_trait]
pub trait EventFeed: Send + Sync {
    async fn run(&self) -> Result<()>;
    async fn publish(&self, event: SystemEvent) -> Result<()>;
    fn subscribe(&self) -> BoxStream<'static, SystemEvent>;
}

/// Feed backed by a broadcast channel. Slow subscribers lose old events
/// rather than blocking the arena.
#[derive(Clone)]
pub struct LocalFeed {
    tx: broadcast::Sender<SystemEvent>,
}

impl LocalFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscription narrowed to a single event kind, for renderers that only
    /// care about, say, commentary lines.
    pub fn subscribe_kind(&self, kind: EventKind) -> BoxStream<'static, SystemEvent> {
        BroadcastStream::new(self.tx.subscribe())
            .filter_map(move |event| async move {
                event.ok().filter(|event| event.kind == kind)
            })
            .boxed()
    }
}

#[async_trait]
impl EventFeed for LocalFeed {
    async fn run(&self) -> Result<()> {
        info!("Starting local arena feed");
        Ok(())
    }

    async fn publish(&self, event: SystemEvent) -> Result<()> {
        // A send error only means nobody is listening yet.
        let _ = self.tx.send(event);
        Ok(())
    }

    fn subscribe(&self) -> BoxStream<'static, SystemEvent> {
        BroadcastStream::new(self.tx.subscribe())
            .filter_map(|event| async move { event.ok() })
            .boxed()
    }
}

/// Generate an error aligned with feed semantics.
pub fn feed_error(message: impl Into<String>) -> RumbleError {
    RumbleError::Feed(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumble_types::events::{EventPayload, LifecycleEvent, LifecyclePhase, OpsEvent};

    fn lifecycle_event(phase: LifecyclePhase) -> SystemEvent {
        SystemEvent::new(
            EventKind::Lifecycle,
            EventPayload::Lifecycle(LifecycleEvent {
                phase,
                details: None,
            }),
        )
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let feed = LocalFeed::new(16);
        let mut stream = feed.subscribe();

        feed.publish(lifecycle_event(LifecyclePhase::Boot))
            .await
            .expect("publish");

        let received = stream.next().await.expect("event delivered");
        assert_eq!(received.kind, EventKind::Lifecycle);
    }

    #[tokio::test]
    async fn kind_filter_drops_other_events() {
        let feed = LocalFeed::new(16);
        let mut stream = feed.subscribe_kind(EventKind::Ops);

        feed.publish(lifecycle_event(LifecyclePhase::Ready))
            .await
            .expect("publish lifecycle");
        feed.publish(SystemEvent::new(
            EventKind::Ops,
            EventPayload::Ops(OpsEvent {
                message: "transcript flushed".into(),
                tags: vec!["ops".into()],
            }),
        ))
        .await
        .expect("publish ops");

        let received = stream.next().await.expect("event delivered");
        assert_eq!(received.kind, EventKind::Ops);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_fine() {
        let feed = LocalFeed::new(4);
        feed.publish(lifecycle_event(LifecyclePhase::Shutdown))
            .await
            .expect("publish into the void");
    }
}
