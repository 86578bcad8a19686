//! HTTP client for the storefront's REST catalog endpoints.

use std::time::Duration;

use promobot_core::{AppConfig, CatalogItem};
use reqwest::Client;

use crate::error::StorefrontError;
use crate::retry::retry_with_backoff;
use crate::types::{
    Collection, CustomCollectionsResponse, Product, ProductsResponse, SmartCollectionsResponse,
};

/// Sentinel `collection_id` meaning "the whole catalog, unfiltered".
pub(crate) const ALL_COLLECTIONS: &str = "all";

/// Versioned path prefix of the storefront admin API.
const API_PREFIX: &str = "admin/api/2024-01";

const USER_AGENT: &str = "promobot/0.1 (storefront-promotion)";

/// Client for the storefront catalog API.
///
/// Fetches collections and products, authenticating with a bearer access
/// token when one is configured. Transient errors (429, 5xx, network
/// failures) are automatically retried with exponential backoff up to
/// `max_retries` additional attempts; terminal errors surface as typed
/// [`StorefrontError`]s for the caller to triage.
pub struct StorefrontClient {
    client: Client,
    /// Scheme+host origin requests and permalinks are built from,
    /// without a trailing slash (e.g. `"https://shop.example.com"`).
    public_origin: String,
    token: Option<String>,
    page_limit: u32,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl StorefrontClient {
    /// Creates a client for the given shop domain (scheme and trailing
    /// slashes are stripped; requests always go out over HTTPS).
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidDomain`] when the domain is empty
    /// after normalization, or [`StorefrontError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        shop_domain: &str,
        token: Option<&str>,
        timeout_secs: u64,
        page_limit: u32,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, StorefrontError> {
        let domain = promobot_core::normalize_shop_domain(shop_domain);
        if domain.is_empty() {
            return Err(StorefrontError::InvalidDomain {
                domain: shop_domain.to_owned(),
                reason: "domain is empty after stripping scheme and slashes".to_owned(),
            });
        }
        Self::with_base_url(
            &format!("https://{domain}"),
            token,
            timeout_secs,
            page_limit,
            max_retries,
            backoff_base_ms,
        )
    }

    /// Creates a client with an explicit base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        base_url: &str,
        token: Option<&str>,
        timeout_secs: u64,
        page_limit: u32,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, StorefrontError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            public_origin: base_url.trim_end_matches('/').to_owned(),
            token: token.map(str::to_owned),
            page_limit,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Creates a client from the process configuration.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`StorefrontClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, StorefrontError> {
        Self::new(
            &config.shop_domain,
            config.storefront_token.as_deref(),
            config.request_timeout_secs,
            config.catalog_page_limit,
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// Lists all collections the operator can target, merging the smart and
    /// custom collection endpoints in that order.
    ///
    /// # Errors
    ///
    /// Propagates the typed error of whichever endpoint fails first.
    pub async fn list_collections(&self) -> Result<Vec<Collection>, StorefrontError> {
        let smart: SmartCollectionsResponse = self
            .get_json(&format!(
                "{}/{API_PREFIX}/smart_collections.json",
                self.public_origin
            ))
            .await?;
        let custom: CustomCollectionsResponse = self
            .get_json(&format!(
                "{}/{API_PREFIX}/custom_collections.json",
                self.public_origin
            ))
            .await?;

        Ok(smart
            .smart_collections
            .into_iter()
            .chain(custom.custom_collections)
            .map(Collection::from)
            .collect())
    }

    /// Fetches one page of products for a collection, or for the whole
    /// catalog when `collection_id` is the `"all"` sentinel.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`StorefrontError::NotFound`] — HTTP 404 (not retried).
    /// - [`StorefrontError::UnexpectedStatus`] — any other non-2xx status (5xx retried, 4xx not).
    /// - [`StorefrontError::Http`] — network or TLS failure after all retries exhausted.
    /// - [`StorefrontError::Deserialize`] — response body is not valid JSON (not retried).
    pub async fn list_products(&self, collection_id: &str) -> Result<Vec<Product>, StorefrontError> {
        let url = self.products_url(collection_id);
        let response: ProductsResponse = self.get_json(&url).await?;
        Ok(response.products)
    }

    /// Fetches a collection's products and reduces them to the read-only
    /// [`CatalogItem`] snapshot the promotion core consumes.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`StorefrontClient::list_products`].
    pub async fn list_items(&self, collection_id: &str) -> Result<Vec<CatalogItem>, StorefrontError> {
        let products = self.list_products(collection_id).await?;
        Ok(products.into_iter().map(|p| self.catalog_item(p)).collect())
    }

    fn catalog_item(&self, product: Product) -> CatalogItem {
        CatalogItem {
            id: product.id.to_string(),
            price: product.display_price().map(str::to_owned),
            image_url: product.primary_image().map(str::to_owned),
            permalink: format!("{}/products/{}", self.public_origin, product.handle),
            title: product.title,
            handle: product.handle,
        }
    }

    fn products_url(&self, collection_id: &str) -> String {
        let origin = &self.public_origin;
        let limit = self.page_limit;
        if collection_id == ALL_COLLECTIONS {
            format!("{origin}/{API_PREFIX}/products.json?limit={limit}")
        } else {
            format!("{origin}/{API_PREFIX}/collections/{collection_id}/products.json?limit={limit}")
        }
    }

    /// Sends a GET request with retry, asserts a 2xx status, and parses the
    /// body as `T`.
    async fn get_json<T>(&self, url: &str) -> Result<T, StorefrontError>
    where
        T: serde::de::DeserializeOwned,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.to_owned();
            async move {
                let mut request = self.client.get(&url);
                if let Some(token) = &self.token {
                    request = request.bearer_auth(token);
                }

                let response = request.send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(StorefrontError::RateLimited { retry_after_secs });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(StorefrontError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(StorefrontError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| StorefrontError::Deserialize {
                    context: url,
                    source: e,
                })
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> StorefrontClient {
        StorefrontClient::with_base_url(base_url, None, 5, 50, 0, 0)
            .expect("client construction should not fail")
    }

    #[test]
    fn new_rejects_empty_domain() {
        let result = StorefrontClient::new("https:///", None, 5, 50, 0, 0);
        assert!(matches!(result, Err(StorefrontError::InvalidDomain { .. })));
    }

    #[test]
    fn products_url_uses_unfiltered_endpoint_for_all_sentinel() {
        let client = test_client("https://shop.example.com");
        assert_eq!(
            client.products_url("all"),
            "https://shop.example.com/admin/api/2024-01/products.json?limit=50"
        );
    }

    #[test]
    fn products_url_scopes_to_collection() {
        let client = test_client("https://shop.example.com/");
        assert_eq!(
            client.products_url("4815162342"),
            "https://shop.example.com/admin/api/2024-01/collections/4815162342/products.json?limit=50"
        );
    }

    #[test]
    fn catalog_item_builds_permalink_from_origin_and_handle() {
        let client = test_client("https://shop.example.com");
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 42,
            "title": "Linen Summer Shirt",
            "handle": "linen-summer-shirt",
            "images": [{"src": "https://cdn.example.com/shirt.jpg"}],
            "variants": [{"price": "24.90"}]
        }))
        .expect("deserialize");

        let item = client.catalog_item(product);
        assert_eq!(item.id, "42");
        assert_eq!(item.price.as_deref(), Some("24.90"));
        assert_eq!(item.image_url.as_deref(), Some("https://cdn.example.com/shirt.jpg"));
        assert_eq!(
            item.permalink,
            "https://shop.example.com/products/linen-summer-shirt"
        );
    }

    #[test]
    fn catalog_item_tolerates_missing_price_and_image() {
        let client = test_client("https://shop.example.com");
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": "Gift Card",
            "handle": "gift-card"
        }))
        .expect("deserialize");

        let item = client.catalog_item(product);
        assert_eq!(item.price, None);
        assert_eq!(item.image_url, None);
    }
}
