//! Outbound delivery of allocation summaries.

use async_trait::async_trait;

/// Result of one delivery attempt. Never an error: delivery is best-effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    /// Delivery was switched off for this run.
    Skipped,
    /// No endpoint configured (e.g. the webhook env var is unset).
    NotConfigured(String),
    Failed(String),
}

impl DeliveryStatus {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, title: &str, body: &str) -> DeliveryStatus;
}
