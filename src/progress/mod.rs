// Progress hub — per-job fan-out of orchestration events
//
// Each job owns a set of subscriber sinks, each a bounded channel. Broadcast
// never awaits a subscriber: a sink whose buffer is full (or whose receiver
// is gone) is dropped on the spot, so one slow client cannot stall the rest.
// The terminal event closes every remaining sink.

mod events;

pub use events::ProgressEvent;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tokio::sync::RwLock;

use crate::config::constants::SUBSCRIBER_CHANNEL_CAPACITY;

/// Thread-safe per-job event fan-out.
#[derive(Clone, Default)]
pub struct ProgressHub {
    subscribers: Arc<RwLock<HashMap<String, Vec<Sender<ProgressEvent>>>>>,
}

impl ProgressHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new subscriber to a job. Events broadcast after this call
    /// will be delivered; there is no historical replay here (terminal
    /// replay for finished jobs is synthesized by the transport layer from
    /// the job record).
    pub async fn subscribe(&self, job_id: &str) -> Receiver<ProgressEvent> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CHANNEL_CAPACITY);
        let mut subscribers = self.subscribers.write().await;
        subscribers.entry(job_id.to_string()).or_default().push(tx);
        rx
    }

    /// Deliver an event to every live subscriber of a job, in emission order.
    ///
    /// Subscribers that are closed or whose buffer has overflowed are
    /// silently removed.
    pub async fn broadcast(&self, job_id: &str, event: ProgressEvent) {
        let mut subscribers = self.subscribers.write().await;
        let Some(sinks) = subscribers.get_mut(job_id) else {
            return;
        };

        sinks.retain(|sink| match sink.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(job_id, "Dropping slow progress subscriber (buffer full)");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        });

        if sinks.is_empty() {
            subscribers.remove(job_id);
        }
    }

    /// Broadcast the terminal event and close all subscribers of the job.
    pub async fn finish(&self, job_id: &str, event: ProgressEvent) {
        self.broadcast(job_id, event).await;
        // Dropping the senders ends every remaining subscriber stream
        self.subscribers.write().await.remove(job_id);
    }

    /// Drop subscribers whose receiver is gone. Used by the transport when
    /// an attachment loses the race with job termination.
    pub async fn prune_closed(&self, job_id: &str) {
        let mut subscribers = self.subscribers.write().await;
        if let Some(sinks) = subscribers.get_mut(job_id) {
            sinks.retain(|sink| !sink.is_closed());
            if sinks.is_empty() {
                subscribers.remove(job_id);
            }
        }
    }

    /// Number of live subscribers for a job (diagnostics and tests).
    pub async fn subscriber_count(&self, job_id: &str) -> usize {
        self.subscribers
            .read()
            .await
            .get(job_id)
            .map_or(0, Vec::len)
    }
}
