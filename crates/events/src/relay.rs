//! Background relay forwarding bus events to the notification service.
//!
//! Fire-and-forget: a failed delivery is logged and dropped. The relay must
//! never surface an error into the operation that published the event.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::bus::QueueEvent;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Forwards every published [`QueueEvent`] to an external notification
/// endpoint via HTTP POST.
pub struct NotificationRelay {
    client: reqwest::Client,
    endpoint: String,
}

impl NotificationRelay {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Consume events from the bus until the bus is dropped.
    ///
    /// Intended to be spawned as a background task from `main`.
    pub async fn run(self, mut rx: broadcast::Receiver<QueueEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => self.deliver(&event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notification relay lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::info!("Notification relay stopped: event bus closed");
    }

    async fn deliver(&self, event: &QueueEvent) {
        let result = self
            .client
            .post(&self.endpoint)
            .json(event)
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        match result {
            Ok(_) => tracing::debug!(event_type = %event.event_type, "Notification delivered"),
            Err(e) => tracing::warn!(
                event_type = %event.event_type,
                error = %e,
                "Notification delivery failed; dropping event"
            ),
        }
    }
}
