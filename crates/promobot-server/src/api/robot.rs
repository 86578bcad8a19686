//! Operator endpoints for the promotion robot: status, configuration,
//! and the manual test run.

use axum::{extract::State, Json};
use serde::Serialize;

use promobot_core::PromotionConfig;
use promobot_engine::{RunOutcome, TriggerSpec};

use super::{map_schedule_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct StatusResponse {
    active: bool,
    /// Next fire time as RFC 3339 in the configured timezone.
    next_run: Option<String>,
}

pub(super) async fn status(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let mut scheduler = state.scheduler.lock().await;
    let status = scheduler
        .status()
        .await
        .map_err(|e| map_schedule_error(&e))?;
    Ok(Json(StatusResponse {
        active: status.active,
        next_run: status.next_run.map(|t| t.to_rfc3339()),
    }))
}

pub(super) async fn get_config(
    State(state): State<AppState>,
) -> Result<Json<PromotionConfig>, ApiError> {
    state
        .store
        .load()
        .map(Json)
        .ok_or_else(|| ApiError::new("not_found", "no promotion configuration saved"))
}

/// Saves a new configuration and re-arms the scheduler atomically.
///
/// Validation happens before anything is persisted or any trigger is
/// touched, so an invalid schedule can never be silently accepted.
pub(super) async fn put_config(
    State(state): State<AppState>,
    Json(config): Json<PromotionConfig>,
) -> Result<Json<StatusResponse>, ApiError> {
    TriggerSpec::from_config(&config).map_err(|e| map_schedule_error(&e))?;
    if config.items_per_run == 0 {
        return Err(ApiError::new(
            "validation_error",
            "itemsPerRun must be at least 1",
        ));
    }

    state.store.save(&config).map_err(|e| {
        tracing::error!(error = %e, "failed to persist promotion configuration");
        ApiError::new("internal_error", format!("failed to persist configuration: {e}"))
    })?;

    let mut scheduler = state.scheduler.lock().await;
    scheduler
        .reconfigure(config)
        .await
        .map_err(|e| map_schedule_error(&e))?;

    let status = scheduler
        .status()
        .await
        .map_err(|e| map_schedule_error(&e))?;
    Ok(Json(StatusResponse {
        active: status.active,
        next_run: status.next_run.map(|t| t.to_rfc3339()),
    }))
}

/// Runs the promotion job once, now, with the persisted configuration:
/// the same `run` the scheduler trigger invokes, with identical semantics.
pub(super) async fn run_now(State(state): State<AppState>) -> Result<Json<RunOutcome>, ApiError> {
    let Some(config) = state.store.load() else {
        return Err(ApiError::new(
            "conflict",
            "no promotion configuration saved; save one before running a test",
        ));
    };

    let outcome = state.job.run(&config).await;
    Ok(Json(outcome))
}
