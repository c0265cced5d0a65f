use crate::app::ports::EventPublisher;
use crate::domain::DomainEvent;
use tokio::sync::broadcast;
use tracing::info;

/// In-process domain-event fanout over a broadcast channel. Slow consumers
/// lag and drop; publishers never block.
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, event: DomainEvent) {
        crate::observability::metrics::events::published(event.kind());
        // Err just means no subscriber is currently listening
        let _ = self.tx.send(event);
    }
}

/// Log every event as it flows through the bus. Runs until the bus closes.
pub async fn run_event_logger(mut rx: broadcast::Receiver<DomainEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => info!(kind = event.kind(), "domain event: {:?}", event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("event logger lagged, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
