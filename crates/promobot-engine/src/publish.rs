//! Webhook delivery for generated promotion posts.

use std::time::Duration;

use promobot_core::{AppConfig, CatalogItem, Platform};
use serde::Serialize;

/// Result of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The delivery endpoint answered 2xx.
    Delivered,
    /// No delivery endpoint is configured; nothing was sent.
    Skipped,
    /// Transport failure or non-2xx response; logged, not retried.
    Failed,
}

/// Outbound payload, one per item. Field names are the delivery endpoint's
/// contract; absent image/price become empty strings rather than nulls.
#[derive(Debug, Serialize)]
struct DeliveryPayload<'a> {
    platform: &'a str,
    title: &'a str,
    text: &'a str,
    image: &'a str,
    price: &'a str,
    url: &'a str,
}

/// Delivers generated posts to the configured automation webhook.
///
/// Delivery is at-most-once per item per run: failures are logged and
/// reported as [`PublishOutcome::Failed`] but never retried and never
/// abort the surrounding run. When no endpoint is configured every publish
/// is a no-op reported as [`PublishOutcome::Skipped`].
pub struct Publisher {
    client: reqwest::Client,
    webhook_url: Option<String>,
    pacing: Duration,
}

impl Publisher {
    /// Creates a publisher. `webhook_url = None` produces a no-op publisher
    /// that reports every attempt as skipped.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(
        webhook_url: Option<&str>,
        pacing_delay_ms: u64,
        timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            webhook_url: webhook_url.map(str::to_owned),
            pacing: Duration::from_millis(pacing_delay_ms),
        })
    }

    /// Creates a publisher from the process configuration.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Publisher::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.webhook_url.as_deref(),
            config.pacing_delay_ms,
            config.request_timeout_secs,
        )
    }

    /// Whether a delivery endpoint is configured at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Minimum spacing between successive deliveries within one run.
    #[must_use]
    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Delivers one generated post. Never fails the caller; the outcome
    /// carries everything the run summary needs.
    pub async fn publish(
        &self,
        item: &CatalogItem,
        platform: Platform,
        text: &str,
    ) -> PublishOutcome {
        let Some(url) = &self.webhook_url else {
            tracing::info!(item = %item.title, "no delivery endpoint configured; skipping publish");
            return PublishOutcome::Skipped;
        };

        let payload = DeliveryPayload {
            platform: platform.as_str(),
            title: &item.title,
            text,
            image: item.image_url.as_deref().unwrap_or(""),
            price: item.price.as_deref().unwrap_or(""),
            url: &item.permalink,
        };

        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(item = %item.title, platform = %platform, "post delivered");
                PublishOutcome::Delivered
            }
            Ok(response) => {
                tracing::warn!(
                    item = %item.title,
                    status = %response.status(),
                    "delivery endpoint rejected post"
                );
                PublishOutcome::Failed
            }
            Err(e) => {
                tracing::warn!(item = %item.title, error = %e, "post delivery failed");
                PublishOutcome::Failed
            }
        }
    }
}
