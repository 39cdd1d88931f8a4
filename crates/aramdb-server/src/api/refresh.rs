use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use aramdb_core::Origin;

use crate::middleware::RequestId;

use super::{map_acquisition_error, ApiError, ApiResponse, AppState, ResponseMeta};

const SAMPLE_SIZE: usize = 5;

#[derive(Debug, Serialize)]
pub(super) struct RefreshOutcome {
    origin: Origin,
    champions_count: usize,
    patch_version: Option<String>,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshInfo {
    age_ms: i64,
    last_update: DateTime<Utc>,
    patch_version: Option<String>,
    champions_count: usize,
    state: String,
    sample: Vec<String>,
}

/// Forces a full fetch-extract-parse cycle. A failed refresh with a previous
/// entry still answers 200 with `origin = "stale-fallback"`.
pub(super) async fn trigger_refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<RefreshOutcome>>, ApiError> {
    tracing::info!(request_id = %req_id.0, "manual refresh requested");
    let result = state
        .service
        .force_refresh()
        .await
        .map_err(|e| map_acquisition_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: RefreshOutcome {
            origin: result.origin,
            champions_count: result.champions_count(),
            patch_version: result.source_version,
            timestamp: result.fetched_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn refresh_info(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<RefreshInfo>>, ApiError> {
    let Some(result) = state.service.cached().await else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            "no cached champion data",
        ));
    };

    let sample = result
        .records
        .values()
        .take(SAMPLE_SIZE)
        .map(|record| record.display_name().to_owned())
        .collect();

    Ok(Json(ApiResponse {
        data: RefreshInfo {
            age_ms: result.age_ms(Utc::now()),
            last_update: result.fetched_at,
            champions_count: result.champions_count(),
            state: state.service.state().await.to_string(),
            patch_version: result.source_version,
            sample,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
