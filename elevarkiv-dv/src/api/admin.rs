//! Admin endpoints: audit-log queries and impersonation
//!
//! Every handler here requires the admin role on the caller.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use crate::access::{Caller, Impersonation};
use crate::api::auth::caller_from_request;
use crate::audit::{AccessLogEntry, LogFilter, StudentSummary, UserSummary};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

fn require_admin(caller: &Caller) -> ApiResult<()> {
    if !caller.has_admin_role {
        return Err(ApiError::Forbidden(
            "You do not have permission to do this".to_string(),
        ));
    }
    Ok(())
}

/// Query parameters for the filtered audit-log lookup
#[derive(Debug, Deserialize)]
pub struct LogEntryQuery {
    pub student_number: Option<String>,
    pub principal_id: Option<String>,
    pub document_number: Option<String>,
}

/// GET /api/admin/logentries
///
/// Empty filter: the 50 most recent entries. Any filter field set: all
/// matches, unbounded. Both newest first.
pub async fn log_entries(
    State(state): State<AppState>,
    Query(query): Query<LogEntryQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<AccessLogEntry>>> {
    let caller = caller_from_request(&state, &headers).await?;
    require_admin(&caller)?;

    let filter = LogFilter {
        student_number: query.student_number,
        principal_id: query.principal_id,
        document_number: query.document_number,
    };
    let entries = state.audit.query(&filter).await?;
    Ok(Json(entries))
}

/// Query parameters for the distinct-name searches
#[derive(Debug, Deserialize)]
pub struct NameSearchQuery {
    pub search_name: Option<String>,
}

/// GET /api/admin/logstudents?search_name=An
pub async fn log_students(
    State(state): State<AppState>,
    Query(query): Query<NameSearchQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<StudentSummary>>> {
    let caller = caller_from_request(&state, &headers).await?;
    require_admin(&caller)?;

    let prefix = query.search_name.unwrap_or_default();
    let students = state.audit.search_students(&prefix).await?;
    Ok(Json(students))
}

/// GET /api/admin/logusers?search_name=Ka
pub async fn log_users(
    State(state): State<AppState>,
    Query(query): Query<NameSearchQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let caller = caller_from_request(&state, &headers).await?;
    require_admin(&caller)?;

    let prefix = query.search_name.unwrap_or_default();
    let users = state.audit.search_users(&prefix).await?;
    Ok(Json(users))
}

/// PUT /api/admin/impersonation
pub async fn set_impersonation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(impersonation): Json<Impersonation>,
) -> ApiResult<StatusCode> {
    let caller = caller_from_request(&state, &headers).await?;
    require_admin(&caller)?;

    if impersonation.target.is_empty() {
        return Err(ApiError::BadRequest(
            "impersonation target must not be empty".to_string(),
        ));
    }

    state
        .impersonation
        .set(&caller.principal_id, impersonation)
        .await;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/admin/impersonation
pub async fn clear_impersonation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let caller = caller_from_request(&state, &headers).await?;
    require_admin(&caller)?;

    state.impersonation.clear(&caller.principal_id).await;
    Ok(StatusCode::NO_CONTENT)
}
