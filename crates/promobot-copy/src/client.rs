//! HTTP client for the hosted text-generation service.

use std::time::Duration;

use promobot_core::{AppConfig, CatalogItem, Platform};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompt::{build_post_prompt, fallback_copy};

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("copy service is not configured")]
    Unconfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from copy service")]
    UnexpectedStatus { status: u16 },

    #[error("copy service response did not parse: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("copy service returned an empty completion")]
    EmptyCompletion,
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct GenerationResponse {
    text: String,
}

/// Client for the hosted text-generation service.
///
/// The typed [`CopyClient::generate`] boundary can fail; the item-facing
/// wrappers ([`CopyClient::generate_post`], [`CopyClient::generate_alt_text`])
/// cannot. On any failure they log and return deterministic local text, so
/// copy generation never blocks a publish.
pub struct CopyClient {
    client: reqwest::Client,
    /// Generation endpoint, e.g. `"{base}/v1/generate"`. `None` when the
    /// service is not configured; every request then takes the fallback path.
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl CopyClient {
    /// Creates a client. `base_url = None` produces a permanently degraded
    /// client whose wrappers always return fallback text.
    ///
    /// # Errors
    ///
    /// Returns [`CopyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: Option<&str>,
        api_key: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, CopyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: base_url.map(|base| format!("{}/v1/generate", base.trim_end_matches('/'))),
            api_key: api_key.map(str::to_owned),
        })
    }

    /// Creates a client from the process configuration.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CopyClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, CopyError> {
        Self::new(
            config.copy_api_url.as_deref(),
            config.copy_api_key.as_deref(),
            config.request_timeout_secs,
        )
    }

    /// Generates a platform- and tone-adapted post for one item.
    ///
    /// Never fails and never returns an empty string: any generation error
    /// degrades to [`fallback_copy`].
    pub async fn generate_post(
        &self,
        item: &CatalogItem,
        platform: Platform,
        tone: &str,
    ) -> String {
        let prompt = build_post_prompt(item, platform, tone);
        match self.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(item = %item.title, error = %e, "copy generation failed; using fallback copy");
                fallback_copy(item)
            }
        }
    }

    /// Generates a descriptive SEO ALT text for a product name.
    ///
    /// Never fails: any generation error degrades to the product name itself.
    pub async fn generate_alt_text(&self, product_name: &str) -> String {
        let prompt =
            format!("Write a descriptive SEO ALT text for a product photo of: {product_name}");
        match self.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(product = %product_name, error = %e, "alt-text generation failed; using product name");
                product_name.to_owned()
            }
        }
    }

    /// Sends one single-turn generation request and returns the completion.
    ///
    /// # Errors
    ///
    /// - [`CopyError::Unconfigured`] — no service URL is configured.
    /// - [`CopyError::Http`] — network failure or timeout.
    /// - [`CopyError::UnexpectedStatus`] — non-2xx response.
    /// - [`CopyError::Deserialize`] — body does not match the expected shape.
    /// - [`CopyError::EmptyCompletion`] — the service returned whitespace.
    pub async fn generate(&self, prompt: &str) -> Result<String, CopyError> {
        let endpoint = self.endpoint.as_deref().ok_or(CopyError::Unconfigured)?;

        let mut request = self
            .client
            .post(endpoint)
            .json(&GenerationRequest { prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CopyError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: GenerationResponse =
            serde_json::from_str(&body).map_err(CopyError::Deserialize)?;

        let text = parsed.text.trim().to_owned();
        if text.is_empty() {
            return Err(CopyError::EmptyCompletion);
        }
        Ok(text)
    }
}
