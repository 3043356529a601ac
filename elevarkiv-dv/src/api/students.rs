//! Student document endpoints

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use crate::api::auth::caller_from_request;
use crate::docs;
use crate::error::ApiResult;
use crate::services::DocumentList;
use crate::AppState;

/// The transport layer addresses students by login prefix; the domain is
/// appended from configuration.
fn student_login(state: &AppState, prefix: &str) -> String {
    format!("{}@{}", prefix, state.config.login_domain)
}

/// GET /api/students/:student_prefix/documents
pub async fn list_documents(
    State(state): State<AppState>,
    Path(student_prefix): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<DocumentList>> {
    let caller = caller_from_request(&state, &headers).await?;
    let login = student_login(&state, &student_prefix);
    let result = docs::list_student_documents(&state, &caller, &login).await?;
    Ok(Json(result))
}

/// GET /api/students/:student_prefix/sources/:source_id/files/:file_id
///
/// Returns the file content as a base64 string.
pub async fn get_file(
    State(state): State<AppState>,
    Path((student_prefix, source_id, file_id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> ApiResult<Json<String>> {
    let caller = caller_from_request(&state, &headers).await?;
    let login = student_login(&state, &student_prefix);
    let content = docs::fetch_file(&state, &caller, &login, &source_id, &file_id).await?;
    Ok(Json(content))
}
