use std::net::SocketAddr;
use std::path::PathBuf;

/// Process-level configuration, loaded once at startup from environment
/// variables. Secrets are redacted from the `Debug` output.
#[derive(Clone)]
pub struct AppConfig {
    /// Storefront public domain with scheme and trailing slashes stripped,
    /// e.g. `"shop.example.com"`. Also the base for product permalinks.
    pub shop_domain: String,
    /// Bearer token for the storefront REST API. Absent means requests go
    /// out unauthenticated and the storefront decides what to serve.
    pub storefront_token: Option<String>,
    /// Base URL of the hosted text-generation service. Absent means all
    /// copy falls back to locally built text.
    pub copy_api_url: Option<String>,
    pub copy_api_key: Option<String>,
    /// Delivery endpoint for outbound promotion payloads. Absent means
    /// publishes are skipped without any network call.
    pub webhook_url: Option<String>,
    /// Path of the persisted promotion configuration document.
    pub config_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Request timeout for every upstream HTTP call. Kept at a few seconds
    /// so a stalled upstream cannot hang the background clock.
    pub request_timeout_secs: u64,
    /// Minimum spacing between successive webhook deliveries in one run.
    pub pacing_delay_ms: u64,
    /// Additional attempts after the first failure for transient
    /// storefront errors. `0` disables retries.
    pub max_retries: u32,
    /// Base delay for the storefront retry backoff, in milliseconds.
    pub retry_backoff_base_ms: u64,
    /// `limit` query parameter for catalog product fetches.
    pub catalog_page_limit: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("shop_domain", &self.shop_domain)
            .field(
                "storefront_token",
                &self.storefront_token.as_ref().map(|_| "[redacted]"),
            )
            .field("copy_api_url", &self.copy_api_url)
            .field(
                "copy_api_key",
                &self.copy_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("webhook_url", &self.webhook_url)
            .field("config_path", &self.config_path)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("pacing_delay_ms", &self.pacing_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("catalog_page_limit", &self.catalog_page_limit)
            .finish()
    }
}
