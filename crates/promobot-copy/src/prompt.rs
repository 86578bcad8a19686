//! Prompt assembly and the deterministic fallback copy.

use promobot_core::{CatalogItem, Platform};

/// Price text used whenever an item has no price.
pub(crate) const PRICE_INQUIRE: &str = "inquire";

/// Per-platform writing guideline embedded in the generation prompt.
pub(crate) fn style_guideline(platform: Platform) -> &'static str {
    match platform {
        Platform::Instagram => "Use hashtags and visual emoji.",
        Platform::TikTok => "Write a short viral script; lean on trends.",
        Platform::LinkedIn => "Professional voice; lead with benefits.",
        Platform::Facebook => "Community framing; make the offer clear.",
    }
}

/// Builds the single-turn generation prompt for one item.
pub(crate) fn build_post_prompt(item: &CatalogItem, platform: Platform, tone: &str) -> String {
    let price = item.price.as_deref().unwrap_or(PRICE_INQUIRE);
    let guideline = style_guideline(platform);
    format!(
        "Act as a social media manager. Write a post for {platform}.\n\
         Product: {title}. Price: {price}.\n\
         Tone: {tone}. Guideline: {guideline}\n\
         Reply with the post text only.",
        title = item.title,
    )
}

/// Deterministic promotional text built only from local item data.
///
/// This is the degradation target for every generation failure: it always
/// contains the item title and the price (or the inquire sentinel), and is
/// never empty.
#[must_use]
pub fn fallback_copy(item: &CatalogItem) -> String {
    let price = item.price.as_deref().unwrap_or(PRICE_INQUIRE);
    format!("On offer: {} for {price}!", item.title)
}
