//! Wire types for the storefront REST API.
//!
//! Collections come from two endpoints (`smart_collections.json` and
//! `custom_collections.json`) whose envelopes differ only in the key name;
//! the client merges both lists. Products use the `products.json` shape:
//! numeric IDs, a `variants` array whose first entry carries the display
//! price as a decimal string, and an `images` array that may be empty.

use serde::Deserialize;

/// Envelope of `GET smart_collections.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct SmartCollectionsResponse {
    #[serde(default)]
    pub smart_collections: Vec<WireCollection>,
}

/// Envelope of `GET custom_collections.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct CustomCollectionsResponse {
    #[serde(default)]
    pub custom_collections: Vec<WireCollection>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCollection {
    pub id: i64,
    pub title: String,
}

/// A product collection the operator can target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Collection ID as an opaque string; compared literally against the
    /// configured `collection_id`.
    pub id: String,
    pub title: String,
}

impl From<WireCollection> for Collection {
    fn from(wire: WireCollection) -> Self {
        Collection {
            id: wire.id.to_string(),
            title: wire.title,
        }
    }
}

/// Envelope of `GET products.json` and
/// `GET collections/{id}/products.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// A single product from the storefront catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    /// Numeric product ID (e.g. `6789012345678`).
    pub id: i64,

    pub title: String,

    /// URL slug for the product page (e.g. `"linen-summer-shirt"`).
    pub handle: String,

    /// Raw HTML product description. May be `null` or absent.
    #[serde(default)]
    pub body_html: Option<String>,

    /// Image gallery; empty for products without photos.
    #[serde(default)]
    pub images: Vec<ProductImage>,

    /// Purchasable variants; the first entry is the storefront default and
    /// carries the display price.
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// Display price from the default variant, as the storefront's decimal
    /// string. `None` for products without variants.
    #[must_use]
    pub fn display_price(&self) -> Option<&str> {
        self.variants.first().map(|v| v.price.as_str())
    }

    /// Primary image URL, if any image exists.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(|i| i.src.as_str())
    }
}

/// A product image.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductImage {
    /// Canonical CDN URL.
    pub src: String,
}

/// A purchasable variant of a [`Product`].
#[derive(Debug, Clone, Deserialize)]
pub struct ProductVariant {
    /// Current price as a decimal string (e.g. `"24.90"`). Never null.
    pub price: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_price_is_first_variant_price() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Shirt",
            "handle": "shirt",
            "variants": [{"price": "24.90"}, {"price": "19.90"}]
        }))
        .expect("deserialize");
        assert_eq!(product.display_price(), Some("24.90"));
    }

    #[test]
    fn display_price_none_without_variants() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Shirt",
            "handle": "shirt"
        }))
        .expect("deserialize");
        assert_eq!(product.display_price(), None);
        assert_eq!(product.primary_image(), None);
    }

    #[test]
    fn wire_collection_id_becomes_opaque_string() {
        let merged: Collection = WireCollection {
            id: 4815162342,
            title: "Summer".to_string(),
        }
        .into();
        assert_eq!(merged.id, "4815162342");
    }
}
