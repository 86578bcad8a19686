//! Authenticated REST client for the storefront catalog, plus the SEO
//! audit heuristics that read the same product data.

mod client;
mod error;
mod retry;
mod seo;
mod types;

pub use client::StorefrontClient;
pub use error::StorefrontError;
pub use seo::{audit_product, SeoAudit};
pub use types::{Collection, Product, ProductImage, ProductVariant};
