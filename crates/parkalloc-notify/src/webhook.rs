//! Webhook delivery: Slack, Discord or a generic JSON endpoint.
//! One POST per summary, bounded by a timeout, never retried.

use async_trait::async_trait;
use parkalloc_core::config::NotifyConfig;
use parkalloc_core::error::{ParkError, Result};
use parkalloc_core::traits::{DeliveryStatus, Notifier};
use std::str::FromStr;
use std::time::Duration;

/// Payload shape expected by the receiving service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookKind {
    /// `{"text": ...}`
    Slack,
    /// `{"content": ...}`
    Discord,
    /// `{"title": ..., "body": ...}`
    Generic,
}

impl WebhookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slack => "slack",
            Self::Discord => "discord",
            Self::Generic => "webhook",
        }
    }

    fn payload(&self, title: &str, body: &str) -> serde_json::Value {
        match self {
            Self::Slack => serde_json::json!({ "text": format!("{title}\n\n{body}") }),
            Self::Discord => serde_json::json!({ "content": format!("{title}\n\n{body}") }),
            Self::Generic => serde_json::json!({ "title": title, "body": body }),
        }
    }
}

impl FromStr for WebhookKind {
    type Err = ParkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "slack" => Ok(Self::Slack),
            "discord" => Ok(Self::Discord),
            "webhook" | "generic" => Ok(Self::Generic),
            other => Err(ParkError::Config(format!("unknown notify target '{other}'"))),
        }
    }
}

pub struct WebhookNotifier {
    kind: WebhookKind,
    url: Option<String>,
    /// Where the URL was expected to come from, for diagnostics.
    source: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(kind: WebhookKind, url: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ParkError::Notify(format!("HTTP client: {e}")))?;
        Ok(Self {
            kind,
            url,
            source: "webhook url".into(),
            timeout,
            client,
        })
    }

    /// Read the endpoint from the env var named in config. An unset or
    /// empty variable is not an error here; delivery reports it instead.
    pub fn from_config(config: &NotifyConfig) -> Result<Self> {
        let kind: WebhookKind = config.target.parse()?;
        let url = std::env::var(&config.webhook_env)
            .ok()
            .filter(|u| !u.trim().is_empty());
        Ok(Self {
            source: config.webhook_env.clone(),
            ..Self::new(kind, url, Duration::from_secs(config.timeout_secs))?
        })
    }

    pub fn kind(&self) -> WebhookKind {
        self.kind
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    async fn deliver(&self, title: &str, body: &str) -> DeliveryStatus {
        let Some(url) = &self.url else {
            let reason = format!("{} not set", self.source);
            tracing::error!("❌ Cannot send {} notification: {reason}", self.kind.as_str());
            return DeliveryStatus::NotConfigured(reason);
        };

        let resp = self
            .client
            .post(url)
            .json(&self.kind.payload(title, body))
            .timeout(self.timeout)
            .send()
            .await;

        match resp {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!("✅ {} notification sent: {title}", self.kind.as_str());
                DeliveryStatus::Sent
            }
            Ok(resp) => {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                let reason = format!("{} webhook error {status}: {text}", self.kind.as_str());
                tracing::warn!("⚠️ {reason}");
                DeliveryStatus::Failed(reason)
            }
            Err(e) => {
                let reason = format!("{} send failed: {e}", self.kind.as_str());
                tracing::warn!("⚠️ {reason}");
                DeliveryStatus::Failed(reason)
            }
        }
    }
}
