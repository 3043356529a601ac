//! Access façade integration tests
//!
//! Exercise listing and file retrieval against the mock collaborators and
//! an in-memory audit log, including the audit side effects.

use elevarkiv_common::config::Config;
use elevarkiv_common::db::init_memory_database;
use elevarkiv_common::Error;
use elevarkiv_dv::access::{AccessReason, Caller};
use elevarkiv_dv::audit::LogFilter;
use elevarkiv_dv::docs::{fetch_file, list_student_documents};
use elevarkiv_dv::services::mock::{MockArchive, MockRosterSource};
use elevarkiv_dv::services::{ArchiveClient, RosterSource};
use elevarkiv_dv::AppState;

const ANNA: &str = "anna10001@skole.example.no"; // contact-teacher student
const BIRK: &str = "birk10002@skole.example.no"; // taught, no contact-teacher status
const CASPER: &str = "casper10003@skole.example.no"; // reachable via IOP class only

async fn state_with(config: Config) -> AppState {
    let pool = init_memory_database().await.expect("in-memory pool");
    AppState::with_collaborators(
        pool,
        config,
        RosterSource::Mock(MockRosterSource::synthetic()),
        ArchiveClient::Mock(MockArchive),
    )
}

async fn default_state() -> AppState {
    state_with(Config::default()).await
}

fn teacher() -> Caller {
    Caller {
        principal_id: "p-1".to_string(),
        principal_name: "kari.nordmann@example.no".to_string(),
        name: "Kari Nordmann".to_string(),
        active_role: "larer".to_string(),
        has_admin_role: false,
        impersonating: None,
    }
}

#[tokio::test]
async fn listing_tags_files_and_logs_the_viewing() {
    let state = default_state().await;
    let result = list_student_documents(&state, &teacher(), ANNA)
        .await
        .unwrap();

    assert!(!result.documents.is_empty());
    assert!(result
        .documents
        .iter()
        .flat_map(|d| &d.files)
        .all(|f| f.can_view));
    // The mock archive always reports one partial error
    assert_eq!(result.errors.len(), 1);

    let entries = state
        .audit
        .query(&LogFilter {
            student_number: Some("10001".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].access_reason, AccessReason::Kontaktlarer);
    assert!(entries[0].file.is_none());
}

#[tokio::test]
async fn listing_without_file_access_still_logs_with_reason_none() {
    let state = default_state().await;
    let result = list_student_documents(&state, &teacher(), BIRK)
        .await
        .unwrap();

    assert!(result
        .documents
        .iter()
        .flat_map(|d| &d.files)
        .all(|f| !f.can_view));

    let entries = state
        .audit
        .query(&LogFilter {
            student_number: Some("10002".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].access_reason, AccessReason::None);
}

#[tokio::test]
async fn documents_are_sorted_newest_first() {
    let state = default_state().await;
    let result = list_student_documents(&state, &teacher(), ANNA)
        .await
        .unwrap();

    let dates: Vec<&str> = result
        .documents
        .iter()
        .map(|d| d.document_date.as_str())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates, sorted);
}

#[tokio::test]
async fn fetch_is_rejected_without_access_and_nothing_is_logged() {
    // No contact-teacher status, both flags off
    let state = default_state().await;
    let result = fetch_file(&state, &teacher(), BIRK, "mainArchive", "90001").await;

    assert!(matches!(result, Err(Error::Unauthorized(_))));

    let entries = state.audit.query(&LogFilter::default()).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn fetch_succeeds_for_contact_teacher_and_logs_the_file() {
    let state = default_state().await;
    let content = fetch_file(&state, &teacher(), ANNA, "mainArchive", "90001")
        .await
        .unwrap();
    assert!(!content.is_empty());

    let entries = state
        .audit
        .query(&LogFilter {
            document_number: Some("24/00123-1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.access_reason, AccessReason::Kontaktlarer);
    assert!(entry.action.contains("Testdokument.pdf"));
    assert_eq!(entry.file.as_ref().unwrap().id, "90001");
}

#[tokio::test]
async fn faglarer_flag_opens_file_access_for_all_teachers() {
    let config = Config {
        faglarer_access_enabled: true,
        ..Config::default()
    };
    let state = state_with(config).await;

    fetch_file(&state, &teacher(), BIRK, "mainArchive", "90001")
        .await
        .unwrap();

    let entries = state.audit.query(&LogFilter::default()).await.unwrap();
    assert_eq!(entries[0].access_reason, AccessReason::Faglarer);
}

#[tokio::test]
async fn iop_flag_opens_file_access_through_qualifying_class() {
    let config = Config {
        iop_access_enabled: true,
        ..Config::default()
    };
    let state = state_with(config).await;

    fetch_file(&state, &teacher(), CASPER, "mainArchive", "90001")
        .await
        .unwrap();

    let entries = state.audit.query(&LogFilter::default()).await.unwrap();
    assert_eq!(entries[0].access_reason, AccessReason::Iop);
}

#[tokio::test]
async fn iop_student_is_rejected_when_flag_is_off() {
    let state = default_state().await;
    let result = fetch_file(&state, &teacher(), CASPER, "mainArchive", "90001").await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));
}

#[tokio::test]
async fn student_outside_roster_gets_generic_error() {
    let state = default_state().await;
    let result = list_student_documents(&state, &teacher(), "ukjent@skole.example.no").await;

    match result {
        Err(Error::Unauthorized(msg)) => {
            assert_eq!(msg, "No access to student, or student is not registered");
        }
        other => panic!("expected unauthorized, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn disallowed_role_is_rejected() {
    let state = default_state().await;
    let mut caller = teacher();
    caller.active_role = "elev".to_string();

    let result = list_student_documents(&state, &caller, ANNA).await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));
}

#[tokio::test]
async fn leader_without_roster_pairing_gets_generic_error() {
    // Leaders pass the role gate, but the leader roster rule is not yet
    // defined, so the presence check fails
    let state = default_state().await;
    let mut caller = teacher();
    caller.active_role = "leder".to_string();

    let result = list_student_documents(&state, &caller, ANNA).await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));
}

#[tokio::test]
async fn unknown_source_is_invalid_input() {
    let state = default_state().await;
    let result = fetch_file(&state, &teacher(), ANNA, "otherArchive", "90001").await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn missing_identifiers_abort_before_any_log_entry() {
    let state = default_state().await;
    let result = fetch_file(&state, &teacher(), ANNA, "mainArchive", "").await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    let entries = state.audit.query(&LogFilter::default()).await.unwrap();
    assert!(entries.is_empty());
}
