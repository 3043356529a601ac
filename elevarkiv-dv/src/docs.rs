//! Access façade for student documents
//!
//! Orchestrates roster resolution, the access decision, the archive
//! collaborator and the audit log for the two use cases: listing a
//! student's documents and fetching one file.
//!
//! Ordering within a request is fixed: the audit entry is written only
//! after the underlying fetch succeeds, and the caller sees the data only
//! after the write has been attempted. An audit write failure fails the
//! request: an unaudited access grant would be a correctness violation,
//! not a degraded feature.

use elevarkiv_common::{Error, Result};
use tracing::{error, info, warn};

use crate::access::{decide, AccessPolicy, Caller};
use crate::audit::{AuditEvent, FileSnapshot, StudentSnapshot, UserSnapshot};
use crate::roster::{resolve_teacher_data, Student};
use crate::services::{DocumentList, MAIN_ARCHIVE_SOURCE_ID};
use crate::AppState;

/// Deliberately identical for "not found" and "forbidden" so existence
/// does not leak through the error message
const GENERIC_ACCESS_ERROR: &str = "No access to student, or student is not registered";

const LIST_DOCUMENTS_ACTION: &str = "Åpnet oversikten over elevens dokumenter";

/// List archived documents for one student on the caller's roster.
///
/// Eligible roles get an audit entry for the viewing attempt regardless of
/// file-level access; the decision only controls the `can_view` tag on
/// each file.
pub async fn list_student_documents(
    state: &AppState,
    caller: &Caller,
    student_login: &str,
) -> Result<DocumentList> {
    if student_login.is_empty() {
        return Err(Error::InvalidInput(
            "missing required parameter student login".to_string(),
        ));
    }

    let student = require_student(state, caller, student_login).await?;
    let policy = AccessPolicy::from_config(&state.config);
    let decision = decide(caller, &student, &policy);

    let mut result = match state
        .archive
        .list_documents(&student.national_id, student_login)
        .await
    {
        Ok(list) => list,
        Err(e) => {
            error!(student = %student_login, error = %e, "Archive document listing failed");
            DocumentList {
                documents: Vec::new(),
                errors: Vec::new(),
            }
        }
    };

    for document in &mut result.documents {
        for file in &mut document.files {
            file.can_view = decision.access;
        }
    }

    // Archive dates are ISO-8601 strings; lexicographic order is
    // chronological. Newest first.
    result
        .documents
        .sort_by(|a, b| b.document_date.cmp(&a.document_date));

    state
        .audit
        .append(AuditEvent {
            user: UserSnapshot::of(caller),
            student: StudentSnapshot::of(&student),
            access_reason: decision.reason,
            action: LIST_DOCUMENTS_ACTION.to_string(),
            file: None,
        })
        .await?;

    info!(
        caller = %caller.principal_name,
        student = %student_login,
        documents = result.documents.len(),
        reason = decision.reason.as_str(),
        "Returned document overview"
    );

    Ok(result)
}

/// Fetch one file's base64 content.
///
/// The access decision must grant before any archive call is made. A
/// failed retrieval surfaces as the same generic error as a roster miss.
pub async fn fetch_file(
    state: &AppState,
    caller: &Caller,
    student_login: &str,
    source_id: &str,
    file_id: &str,
) -> Result<String> {
    if student_login.is_empty() {
        return Err(Error::InvalidInput(
            "missing required parameter student login".to_string(),
        ));
    }
    if source_id.is_empty() {
        return Err(Error::InvalidInput(
            "missing required parameter source id".to_string(),
        ));
    }
    if file_id.is_empty() {
        return Err(Error::InvalidInput(
            "missing required parameter file id".to_string(),
        ));
    }

    let student = require_student(state, caller, student_login).await?;
    let policy = AccessPolicy::from_config(&state.config);
    let decision = decide(caller, &student, &policy);

    if !decision.access {
        warn!(
            caller = %caller.principal_name,
            student = %student_login,
            "Caller does not have file access for student"
        );
        return Err(Error::Unauthorized(
            "Du har ikke tilgang til å se dette dokumentet".to_string(),
        ));
    }

    if source_id != MAIN_ARCHIVE_SOURCE_ID {
        return Err(Error::InvalidInput(format!(
            "unknown document source: {}",
            source_id
        )));
    }

    let file = state.archive.fetch_file(file_id).await.map_err(|e| {
        error!(file = %file_id, error = %e, "File retrieval from archive failed");
        Error::Unauthorized(GENERIC_ACCESS_ERROR.to_string())
    })?;

    state
        .audit
        .append(AuditEvent {
            user: UserSnapshot::of(caller),
            student: StudentSnapshot::of(&student),
            access_reason: decision.reason,
            action: format!(
                "Åpnet filen {} i dokument {}",
                file.title, file.document_number
            ),
            file: Some(FileSnapshot {
                id: file_id.to_string(),
                title: file.title.clone(),
                document_number: file.document_number.clone(),
                source_id: source_id.to_string(),
            }),
        })
        .await?;

    info!(
        caller = %caller.principal_name,
        student = %student_login,
        file = %file_id,
        reason = decision.reason.as_str(),
        "Returned file content"
    );

    Ok(file.content)
}

/// Role gate plus roster presence check, shared by both operations.
///
/// The roster is resolved unmasked here: the archive contract consumes the
/// full national id, and the membership check is identical under either
/// view. Masked rosters are what callers get from the roster endpoint.
async fn require_student(
    state: &AppState,
    caller: &Caller,
    student_login: &str,
) -> Result<Student> {
    let can_view = caller.acts_as_teacher(&state.config.teacher_role)
        || caller.acts_as_leader(&state.config.leader_role);
    if !can_view {
        warn!(
            caller = %caller.principal_name,
            role = %caller.active_role,
            "Role is not allowed to view documents"
        );
        return Err(Error::Unauthorized(
            "Not allowed to view documents with current role".to_string(),
        ));
    }

    let data = resolve_teacher_data(&state.roster, caller, &state.config, false).await?;
    let student = data
        .students
        .into_iter()
        .find(|s| s.login_handle == student_login);

    match student {
        Some(student) => Ok(student),
        None => {
            warn!(
                caller = %caller.principal_name,
                student = %student_login,
                "Student is not on the caller's roster"
            );
            Err(Error::Unauthorized(GENERIC_ACCESS_ERROR.to_string()))
        }
    }
}
