//! Storefront-backed endpoints: the collection list for the config UI and
//! the SEO panel.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use promobot_storefront::{audit_product, StorefrontError};

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CollectionItem {
    id: String,
    title: String,
}

pub(super) async fn list_collections(
    State(state): State<AppState>,
) -> Result<Json<Vec<CollectionItem>>, ApiError> {
    let collections = state
        .storefront
        .list_collections()
        .await
        .map_err(|e| map_storefront_error(&e))?;

    Ok(Json(
        collections
            .into_iter()
            .map(|c| CollectionItem {
                id: c.id,
                title: c.title,
            })
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
pub(super) struct AuditRow {
    title: String,
    score: i32,
    issues: Vec<&'static str>,
}

pub(super) async fn seo_audit(
    State(state): State<AppState>,
) -> Result<Json<Vec<AuditRow>>, ApiError> {
    let products = state
        .storefront
        .list_products("all")
        .await
        .map_err(|e| map_storefront_error(&e))?;

    Ok(Json(
        products
            .iter()
            .map(|p| {
                let audit = audit_product(p);
                AuditRow {
                    title: p.title.clone(),
                    score: audit.score,
                    issues: audit.issues,
                }
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct AltTextQuery {
    title: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AltTextResponse {
    alt: String,
}

pub(super) async fn alt_text(
    State(state): State<AppState>,
    Query(query): Query<AltTextQuery>,
) -> Json<AltTextResponse> {
    // Alt-text generation never fails; it degrades to the product name.
    let alt = state.copy.generate_alt_text(&query.title).await;
    Json(AltTextResponse { alt })
}

fn map_storefront_error(error: &StorefrontError) -> ApiError {
    tracing::warn!(error = %error, "storefront request failed");
    ApiError::new("bad_gateway", format!("storefront request failed: {error}"))
}
