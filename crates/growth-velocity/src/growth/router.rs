use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{GrowthObservation, IntervalBucket, Measurement, MeasurementKind, Sex};
use super::evaluation::StrategyKind;
use super::series::ChildProfile;
use super::service::{GrowthServiceError, GrowthVelocityService};

/// Body of `POST /api/v1/growth/evaluate`.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    #[serde(flatten)]
    pub observation: GrowthObservation,
    #[serde(default)]
    pub strategy: Option<StrategyKind>,
}

/// Body of `POST /api/v1/growth/series`.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesRequest {
    pub child: ChildProfile,
    pub measurements: Vec<Measurement>,
    #[serde(default)]
    pub strategy: Option<StrategyKind>,
}

/// Router builder exposing evaluation and reference lookup endpoints.
pub fn growth_router(service: Arc<GrowthVelocityService>) -> Router {
    Router::new()
        .route("/api/v1/growth/evaluate", post(evaluate_handler))
        .route("/api/v1/growth/series", post(series_handler))
        .route(
            "/api/v1/growth/reference/:kind/:sex/:interval",
            get(reference_handler),
        )
        .with_state(service)
}

pub(crate) async fn evaluate_handler(
    State(service): State<Arc<GrowthVelocityService>>,
    axum::Json(request): axum::Json<EvaluateRequest>,
) -> Response {
    match service.evaluate(&request.observation, request.strategy) {
        Ok(status) => (StatusCode::OK, axum::Json(status)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn series_handler(
    State(service): State<Arc<GrowthVelocityService>>,
    axum::Json(request): axum::Json<SeriesRequest>,
) -> Response {
    match service.evaluate_series(&request.child, &request.measurements, request.strategy) {
        Ok(series) => (StatusCode::OK, axum::Json(series)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reference_handler(
    State(service): State<Arc<GrowthVelocityService>>,
    Path((kind, sex, interval)): Path<(String, String, String)>,
) -> Response {
    let parsed = kind.parse::<MeasurementKind>().and_then(|kind| {
        let sex = sex.parse::<Sex>()?;
        let bucket = interval.parse::<IntervalBucket>()?;
        Ok((kind, sex, bucket))
    });

    let (kind, sex, bucket) = match parsed {
        Ok(coordinates) => coordinates,
        Err(error) => {
            let payload = json!({ "error": error });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.reference_table(kind, sex, bucket) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: GrowthServiceError) -> Response {
    let status = match error {
        GrowthServiceError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GrowthServiceError::TableNotFound(_) | GrowthServiceError::Unpublished(_) => {
            StatusCode::NOT_FOUND
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
