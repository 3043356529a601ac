//! System info endpoint

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::api::auth::caller_from_request;
use crate::error::ApiResult;
use crate::AppState;

/// Version and feature-flag state, consumed by the frontend
#[derive(Debug, Serialize)]
pub struct SystemInfoResponse {
    pub version: String,
    pub faglarer_access_enabled: bool,
    pub iop_access_enabled: bool,
}

/// GET /api/system
pub async fn system_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SystemInfoResponse>> {
    caller_from_request(&state, &headers).await?;

    Ok(Json(SystemInfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        faglarer_access_enabled: state.config.faglarer_access_enabled,
        iop_access_enabled: state.config.iop_access_enabled,
    }))
}
