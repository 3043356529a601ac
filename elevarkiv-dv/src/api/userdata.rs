//! Roster endpoint
//!
//! Returns the caller's resolved roster (masked SSN view) together with
//! the caller record and the teacher's person data.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::access::Caller;
use crate::api::auth::caller_from_request;
use crate::error::ApiResult;
use crate::roster::{resolve_teacher_data, PersonData, RejectedRelationship, Student};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UserDataResponse {
    pub user: Caller,
    pub person: Option<PersonData>,
    pub students: Vec<Student>,
    pub rejected_relationships: Vec<RejectedRelationship>,
}

/// GET /api/userdata
pub async fn get_userdata(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<UserDataResponse>> {
    let caller = caller_from_request(&state, &headers).await?;

    // Callers always get the masked view; the unmasked roster exists only
    // inside the document façade
    let data = resolve_teacher_data(&state.roster, &caller, &state.config, true).await?;

    Ok(Json(UserDataResponse {
        user: caller,
        person: data.person,
        students: data.students,
        rejected_relationships: data.rejected_relationships,
    }))
}
