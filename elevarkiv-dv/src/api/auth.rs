//! Caller extraction
//!
//! The authentication layer in front of this service (gateway/reverse
//! proxy) resolves the caller and forwards the identity in trusted
//! headers. This module turns those headers into a [`Caller`] and attaches
//! any impersonation target an administrator has chosen.

use axum::http::HeaderMap;

use crate::access::Caller;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
const PRINCIPAL_NAME_HEADER: &str = "x-principal-name";
const DISPLAY_NAME_HEADER: &str = "x-display-name";
const ACTIVE_ROLE_HEADER: &str = "x-active-role";
const ADMIN_ROLE_HEADER: &str = "x-admin-role";

/// Resolve the caller for one request
pub async fn caller_from_request(state: &AppState, headers: &HeaderMap) -> ApiResult<Caller> {
    let mut caller = parse_headers(headers)?;

    // Impersonation is advisory context chosen by the admin earlier in the
    // session; it only ever applies to admin callers
    if caller.has_admin_role {
        caller.impersonating = state.impersonation.get(&caller.principal_id).await;
    }

    Ok(caller)
}

fn parse_headers(headers: &HeaderMap) -> ApiResult<Caller> {
    let required = |name: &str| -> ApiResult<String> {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", name)))
    };

    let has_admin_role = headers
        .get(ADMIN_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == "true")
        .unwrap_or(false);

    Ok(Caller {
        principal_id: required(PRINCIPAL_ID_HEADER)?,
        principal_name: required(PRINCIPAL_NAME_HEADER)?,
        name: required(DISPLAY_NAME_HEADER)?,
        active_role: required(ACTIVE_ROLE_HEADER)?,
        has_admin_role,
        impersonating: None,
    })
}
