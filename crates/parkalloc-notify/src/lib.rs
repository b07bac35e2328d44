//! # ParkAlloc Notify
//!
//! Turns an allocation record into a short text summary and posts it to
//! a chat webhook. Delivery is best-effort: every outcome is reported as a
//! [`DeliveryStatus`], never as an error.

pub mod summary;
pub mod webhook;

pub use summary::{Summary, summarize};
pub use webhook::{WebhookKind, WebhookNotifier};

use parkalloc_core::config::NotifyConfig;
use parkalloc_core::error::Result;
use parkalloc_core::traits::Notifier;

/// Build the configured notifier, or `None` when notifications are disabled.
pub fn notifier_from_config(config: &NotifyConfig) -> Result<Option<Box<dyn Notifier>>> {
    if !config.enabled {
        tracing::debug!("🔕 Notifications disabled in config");
        return Ok(None);
    }
    let notifier = WebhookNotifier::from_config(config)?;
    if notifier.is_configured() {
        tracing::debug!("🔔 {} webhook notifier ready", notifier.kind().as_str());
    } else {
        tracing::warn!(
            "🔕 {} webhook enabled but {} is not set",
            notifier.kind().as_str(),
            config.webhook_env
        );
    }
    Ok(Some(Box::new(notifier)))
}
