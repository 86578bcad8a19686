use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::app_config::AppConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Strips the scheme and any trailing slashes from a configured shop domain.
///
/// `"https://shop.example.com/"` and `"shop.example.com"` both normalize to
/// `"shop.example.com"`. The storefront client and permalink builder always
/// work from this bare-domain form.
#[must_use]
pub fn normalize_shop_domain(raw: &str) -> String {
    raw.trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_matches('/')
        .to_string()
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the actual environment so
/// it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var`
/// needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let shop_domain = normalize_shop_domain(&require("PROMOBOT_SHOP_DOMAIN")?);
    if shop_domain.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "PROMOBOT_SHOP_DOMAIN".to_string(),
            reason: "domain is empty after stripping scheme and slashes".to_string(),
        });
    }

    let storefront_token = optional("PROMOBOT_STOREFRONT_TOKEN");
    let copy_api_url = optional("PROMOBOT_COPY_API_URL");
    let copy_api_key = optional("PROMOBOT_COPY_API_KEY");
    let webhook_url = optional("PROMOBOT_WEBHOOK_URL");

    let config_path = PathBuf::from(or_default("PROMOBOT_CONFIG_PATH", "./promobot_config.json"));
    let bind_addr = parse_addr("PROMOBOT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("PROMOBOT_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("PROMOBOT_REQUEST_TIMEOUT_SECS", "5")?;
    let pacing_delay_ms = parse_u64("PROMOBOT_PACING_DELAY_MS", "2000")?;
    let max_retries = parse_u32("PROMOBOT_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("PROMOBOT_RETRY_BACKOFF_BASE_MS", "500")?;
    let catalog_page_limit = parse_u32("PROMOBOT_CATALOG_PAGE_LIMIT", "50")?;

    Ok(AppConfig {
        shop_domain,
        storefront_token,
        copy_api_url,
        copy_api_key,
        webhook_url,
        config_path,
        bind_addr,
        log_level,
        request_timeout_secs,
        pacing_delay_ms,
        max_retries,
        retry_backoff_base_ms,
        catalog_page_limit,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with the one required env var populated.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("PROMOBOT_SHOP_DOMAIN", "https://shop.example.com/");
        m
    }

    #[test]
    fn normalize_shop_domain_strips_scheme_and_slashes() {
        assert_eq!(
            normalize_shop_domain("https://shop.example.com/"),
            "shop.example.com"
        );
        assert_eq!(
            normalize_shop_domain("http://shop.example.com"),
            "shop.example.com"
        );
        assert_eq!(
            normalize_shop_domain("  shop.example.com  "),
            "shop.example.com"
        );
    }

    #[test]
    fn build_app_config_fails_without_shop_domain() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PROMOBOT_SHOP_DOMAIN"),
            "expected MissingEnvVar(PROMOBOT_SHOP_DOMAIN), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_domain_that_is_only_scheme() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("PROMOBOT_SHOP_DOMAIN", "https:///");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PROMOBOT_SHOP_DOMAIN"),
            "expected InvalidEnvVar(PROMOBOT_SHOP_DOMAIN), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_succeeds_with_defaults() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).expect("should build");
        assert_eq!(cfg.shop_domain, "shop.example.com");
        assert!(cfg.storefront_token.is_none());
        assert!(cfg.webhook_url.is_none());
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.request_timeout_secs, 5);
        assert_eq!(cfg.pacing_delay_ms, 2000);
        assert_eq!(cfg.max_retries, 2);
        assert_eq!(cfg.retry_backoff_base_ms, 500);
        assert_eq!(cfg.catalog_page_limit, 50);
        assert_eq!(
            cfg.config_path,
            PathBuf::from("./promobot_config.json")
        );
    }

    #[test]
    fn build_app_config_empty_optional_vars_are_treated_as_unset() {
        let mut map = full_env();
        map.insert("PROMOBOT_WEBHOOK_URL", "   ");
        map.insert("PROMOBOT_STOREFRONT_TOKEN", "");
        let cfg = build_app_config(lookup_from_map(&map)).expect("should build");
        assert!(cfg.webhook_url.is_none());
        assert!(cfg.storefront_token.is_none());
    }

    #[test]
    fn build_app_config_overrides_are_applied() {
        let mut map = full_env();
        map.insert("PROMOBOT_WEBHOOK_URL", "https://hooks.example.com/x");
        map.insert("PROMOBOT_PACING_DELAY_MS", "250");
        map.insert("PROMOBOT_MAX_RETRIES", "4");
        let cfg = build_app_config(lookup_from_map(&map)).expect("should build");
        assert_eq!(cfg.webhook_url.as_deref(), Some("https://hooks.example.com/x"));
        assert_eq!(cfg.pacing_delay_ms, 250);
        assert_eq!(cfg.max_retries, 4);
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map = full_env();
        map.insert("PROMOBOT_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PROMOBOT_BIND_ADDR"),
            "expected InvalidEnvVar(PROMOBOT_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_non_numeric_pacing() {
        let mut map = full_env();
        map.insert("PROMOBOT_PACING_DELAY_MS", "fast");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PROMOBOT_PACING_DELAY_MS"),
            "expected InvalidEnvVar(PROMOBOT_PACING_DELAY_MS), got: {result:?}"
        );
    }
}
