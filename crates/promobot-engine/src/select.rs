//! Candidate selection for one promotion run.

use promobot_core::CatalogItem;

/// Samples `count` items from the catalog uniformly, without replacement.
///
/// Returns exactly `min(count, items.len())` items, each appearing once.
/// No ordering is promised to downstream consumers. An empty catalog yields
/// an empty selection.
#[must_use]
pub fn select_items(items: &[CatalogItem], count: usize) -> Vec<CatalogItem> {
    let amount = count.min(items.len());
    if amount == 0 {
        return Vec::new();
    }

    let mut rng = rand::rng();
    rand::seq::index::sample(&mut rng, items.len(), amount)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}
