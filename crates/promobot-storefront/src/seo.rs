//! SEO audit heuristics over storefront products.

use crate::types::Product;

/// Result of auditing one product: a 0–100 score and the issues found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoAudit {
    pub score: i32,
    pub issues: Vec<&'static str>,
}

/// Scores a product against the storefront SEO checklist.
///
/// Starts at 100 and deducts per issue: a title under 20 characters costs
/// 15, a missing image costs 30, a description under 100 characters costs
/// 10. The description length is measured on the raw `body_html` value,
/// treating an absent description as empty.
#[must_use]
pub fn audit_product(product: &Product) -> SeoAudit {
    let mut score = 100;
    let mut issues = Vec::new();

    if product.title.chars().count() < 20 {
        score -= 15;
        issues.push("short title");
    }

    if product.images.is_empty() {
        score -= 30;
        issues.push("missing image");
    }

    let description_len = product
        .body_html
        .as_deref()
        .unwrap_or("")
        .chars()
        .count();
    if description_len < 100 {
        score -= 10;
        issues.push("thin description");
    }

    SeoAudit { score, issues }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(title: &str, image: bool, description_len: usize) -> Product {
        let images = if image {
            serde_json::json!([{"src": "https://cdn.example.com/p.jpg"}])
        } else {
            serde_json::json!([])
        };
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": title,
            "handle": "p",
            "body_html": "d".repeat(description_len),
            "images": images,
            "variants": [{"price": "10.00"}]
        }))
        .expect("deserialize")
    }

    #[test]
    fn clean_product_scores_full_marks() {
        let audit = audit_product(&product("A Perfectly Long Product Title", true, 150));
        assert_eq!(audit.score, 100);
        assert!(audit.issues.is_empty());
    }

    #[test]
    fn short_title_costs_fifteen() {
        let audit = audit_product(&product("Shirt", true, 150));
        assert_eq!(audit.score, 85);
        assert_eq!(audit.issues, vec!["short title"]);
    }

    #[test]
    fn missing_image_costs_thirty() {
        let audit = audit_product(&product("A Perfectly Long Product Title", false, 150));
        assert_eq!(audit.score, 70);
        assert_eq!(audit.issues, vec!["missing image"]);
    }

    #[test]
    fn thin_description_costs_ten() {
        let audit = audit_product(&product("A Perfectly Long Product Title", true, 99));
        assert_eq!(audit.score, 90);
        assert_eq!(audit.issues, vec!["thin description"]);
    }

    #[test]
    fn all_issues_stack() {
        let audit = audit_product(&product("Shirt", false, 0));
        assert_eq!(audit.score, 45);
        assert_eq!(
            audit.issues,
            vec!["short title", "missing image", "thin description"]
        );
    }

    #[test]
    fn absent_description_counts_as_thin() {
        let p: Product = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "A Perfectly Long Product Title",
            "handle": "p",
            "images": [{"src": "https://cdn.example.com/p.jpg"}]
        }))
        .expect("deserialize");
        let audit = audit_product(&p);
        assert_eq!(audit.issues, vec!["thin description"]);
    }
}
