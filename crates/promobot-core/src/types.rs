//! Shared domain types for the promotion robot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Social platform a promotion run targets.
///
/// Serialized with the display spelling (`"Instagram"`, `"TikTok"`, ...) so
/// the persisted configuration document stays human-editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    Facebook,
    TikTok,
    LinkedIn,
}

impl Platform {
    /// All supported platforms, in configuration-UI order.
    pub const ALL: [Platform; 4] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::TikTok,
        Platform::LinkedIn,
    ];

    /// The platform name as it appears in outbound payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::TikTok => "TikTok",
            Platform::LinkedIn => "LinkedIn",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "facebook" => Ok(Platform::Facebook),
            "tiktok" => Ok(Platform::TikTok),
            "linkedin" => Ok(Platform::LinkedIn),
            other => Err(format!(
                "unknown platform '{other}' (expected one of: Instagram, Facebook, TikTok, LinkedIn)"
            )),
        }
    }
}

/// The single active promotion configuration.
///
/// Persisted as one JSON document with camelCase field names
/// (`{platform, tone, collectionId, itemsPerRun, timeOfDay, timezone}`).
/// Every field carries a default so a partially written document still
/// loads; an absent field is simply "unset" and falls back to the value
/// the configuration UI would have preselected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionConfig {
    #[serde(default = "default_platform")]
    pub platform: Platform,

    /// Free-form tone label embedded in the generation prompt
    /// (e.g. `"Fun"`, `"Urgent"`, `"Professional"`, `"Luxury"`).
    #[serde(default = "default_tone")]
    pub tone: String,

    /// Opaque collection identifier, or the sentinel `"all"` for the whole
    /// catalog. Compared literally, never parsed.
    #[serde(default = "default_collection_id")]
    pub collection_id: String,

    /// How many items one run publishes. Always at least 1.
    #[serde(default = "default_items_per_run")]
    pub items_per_run: u32,

    /// Local wall-clock fire time as `"HH:MM"`. An empty string means no
    /// fixed time was chosen and the scheduler falls back to a daily
    /// interval trigger.
    #[serde(default = "default_time_of_day")]
    pub time_of_day: String,

    /// IANA timezone name the `time_of_day` is local to.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        PromotionConfig {
            platform: default_platform(),
            tone: default_tone(),
            collection_id: default_collection_id(),
            items_per_run: default_items_per_run(),
            time_of_day: default_time_of_day(),
            timezone: default_timezone(),
        }
    }
}

impl PromotionConfig {
    /// Parses `time_of_day` into `(hour, minute)`.
    ///
    /// Returns `None` when the field is not a valid `"HH:MM"` wall-clock
    /// time. An empty string is also `None`; callers decide whether that
    /// means "interval fallback" or "reject".
    #[must_use]
    pub fn time_of_day_parts(&self) -> Option<(u32, u32)> {
        let (h, m) = self.time_of_day.split_once(':')?;
        let hour: u32 = h.parse().ok()?;
        let minute: u32 = m.parse().ok()?;
        (hour < 24 && minute < 60).then_some((hour, minute))
    }
}

fn default_platform() -> Platform {
    Platform::Instagram
}

fn default_tone() -> String {
    "Fun".to_string()
}

fn default_collection_id() -> String {
    "all".to_string()
}

fn default_items_per_run() -> u32 {
    2
}

fn default_time_of_day() -> String {
    "10:00".to_string()
}

fn default_timezone() -> String {
    "Europe/Madrid".to_string()
}

/// A promotable product as the core sees it: a read-only snapshot of the
/// storefront's catalog entry, already reduced to the fields a post needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Storefront product ID, stored as a string to avoid precision loss.
    pub id: String,
    pub title: String,
    /// Price as a decimal string exactly as the storefront returns it
    /// (e.g. `"24.90"`), or `None` when the product has no variants.
    pub price: Option<String>,
    /// Primary image URL, if the product has any image.
    pub image_url: Option<String>,
    /// URL slug, e.g. `"linen-summer-shirt"`.
    pub handle: String,
    /// Canonical public product URL, built from the shop domain and handle.
    pub permalink: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_round_trips_through_display_and_from_str() {
        for platform in Platform::ALL {
            let parsed: Platform = platform.as_str().parse().expect("should parse");
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn platform_from_str_is_case_insensitive() {
        assert_eq!("tiktok".parse::<Platform>(), Ok(Platform::TikTok));
        assert_eq!("LINKEDIN".parse::<Platform>(), Ok(Platform::LinkedIn));
    }

    #[test]
    fn platform_from_str_rejects_unknown() {
        assert!("myspace".parse::<Platform>().is_err());
    }

    #[test]
    fn config_serializes_with_camel_case_field_names() {
        let json = serde_json::to_value(PromotionConfig::default()).expect("serialize");
        let obj = json.as_object().expect("object");
        for key in [
            "platform",
            "tone",
            "collectionId",
            "itemsPerRun",
            "timeOfDay",
            "timezone",
        ] {
            assert!(obj.contains_key(key), "missing field {key}: {json}");
        }
    }

    #[test]
    fn config_with_missing_fields_falls_back_to_defaults() {
        let cfg: PromotionConfig = serde_json::from_str("{}").expect("empty object should load");
        assert_eq!(cfg, PromotionConfig::default());
        assert_eq!(cfg.platform, Platform::Instagram);
        assert_eq!(cfg.items_per_run, 2);
        assert_eq!(cfg.time_of_day, "10:00");
        assert_eq!(cfg.timezone, "Europe/Madrid");
    }

    #[test]
    fn config_partial_document_keeps_provided_values() {
        let cfg: PromotionConfig =
            serde_json::from_str(r#"{"platform":"TikTok","itemsPerRun":5}"#).expect("should load");
        assert_eq!(cfg.platform, Platform::TikTok);
        assert_eq!(cfg.items_per_run, 5);
        assert_eq!(cfg.tone, "Fun");
    }

    #[test]
    fn time_of_day_parts_parses_valid_times() {
        let mut cfg = PromotionConfig::default();
        assert_eq!(cfg.time_of_day_parts(), Some((10, 0)));
        cfg.time_of_day = "23:59".to_string();
        assert_eq!(cfg.time_of_day_parts(), Some((23, 59)));
        cfg.time_of_day = "0:05".to_string();
        assert_eq!(cfg.time_of_day_parts(), Some((0, 5)));
    }

    #[test]
    fn time_of_day_parts_rejects_invalid_times() {
        let mut cfg = PromotionConfig::default();
        for bad in ["24:00", "10:60", "10", "ten o'clock", "", "10:0x"] {
            cfg.time_of_day = bad.to_string();
            assert_eq!(cfg.time_of_day_parts(), None, "should reject {bad:?}");
        }
    }
}
