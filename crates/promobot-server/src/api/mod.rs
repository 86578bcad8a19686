mod robot;
mod storefront;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use promobot_copy::CopyClient;
use promobot_core::ConfigStore;
use promobot_engine::{PromotionJob, RobotScheduler, ScheduleError};
use promobot_storefront::StorefrontClient;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<Mutex<RobotScheduler>>,
    pub store: Arc<ConfigStore>,
    pub job: Arc<PromotionJob>,
    pub storefront: Arc<StorefrontClient>,
    pub copy: Arc<CopyClient>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::UNPROCESSABLE_ENTITY,
            "conflict" => StatusCode::CONFLICT,
            "bad_gateway" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Maps a scheduler error onto the API taxonomy: validation failures are
/// the operator's to fix, everything else is the server's.
pub(super) fn map_schedule_error(error: &ScheduleError) -> ApiError {
    match error {
        ScheduleError::InvalidTimezone(_) | ScheduleError::InvalidTimeOfDay(_) => {
            ApiError::new("validation_error", error.to_string())
        }
        ScheduleError::ShutDown => ApiError::new("conflict", error.to_string()),
        ScheduleError::Scheduler(_) => {
            tracing::error!(error = %error, "scheduler operation failed");
            ApiError::new("internal_error", "scheduler operation failed")
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/robot/status", get(robot::status))
        .route(
            "/api/robot/config",
            get(robot::get_config).put(robot::put_config),
        )
        .route("/api/robot/run", post(robot::run_now))
        .route(
            "/api/storefront/collections",
            get(storefront::list_collections),
        )
        .route("/api/seo/audit", get(storefront::seo_audit))
        .route("/api/seo/alt-text", get(storefront::alt_text))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
