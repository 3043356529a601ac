//! Audit log store integration tests
//!
//! Runs against an in-memory SQLite pool; the store creates its
//! school-year partition on first use.

use elevarkiv_common::db::init_memory_database;
use elevarkiv_dv::access::{AccessReason, Impersonation, ImpersonationKind};
use elevarkiv_dv::audit::{
    AuditEvent, AuditLog, FileSnapshot, LogFilter, StudentSnapshot, StudentSummary, UserSnapshot,
};

async fn audit_log() -> AuditLog {
    let pool = init_memory_database().await.expect("in-memory pool");
    AuditLog::new(pool)
}

fn user(name: &str, principal_id: &str) -> UserSnapshot {
    UserSnapshot {
        principal_id: principal_id.to_string(),
        principal_name: format!("{}@example.no", principal_id),
        name: name.to_string(),
        role: "larer".to_string(),
        has_admin_role: false,
        impersonating: None,
    }
}

fn student(name: &str, student_number: &str) -> StudentSnapshot {
    StudentSnapshot {
        name: name.to_string(),
        login_handle: format!("{}@skole.example.no", student_number),
        student_number: student_number.to_string(),
    }
}

fn overview_event(user_name: &str, principal_id: &str, student_number: &str) -> AuditEvent {
    AuditEvent {
        user: user(user_name, principal_id),
        student: student("Elev Demo", student_number),
        access_reason: AccessReason::Kontaktlarer,
        action: "Åpnet oversikten over elevens dokumenter".to_string(),
        file: None,
    }
}

fn file_event(document_number: &str) -> AuditEvent {
    AuditEvent {
        user: user("Kari Nordmann", "p-1"),
        student: student("Elev Demo", "42"),
        access_reason: AccessReason::Faglarer,
        action: format!("Åpnet filen Vitnemål.pdf i dokument {}", document_number),
        file: Some(FileSnapshot {
            id: "411732".to_string(),
            title: "Vitnemål.pdf".to_string(),
            document_number: document_number.to_string(),
            source_id: "mainArchive".to_string(),
        }),
    }
}

#[tokio::test]
async fn written_entry_is_found_by_document_number() {
    let log = audit_log().await;
    log.append(file_event("24/9999-1")).await.unwrap();

    let filter = LogFilter {
        document_number: Some("24/9999-1".to_string()),
        ..Default::default()
    };
    let entries = log.query(&filter).await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.access_reason, AccessReason::Faglarer);
    assert_eq!(entry.student.student_number, "42");
    let file = entry.file.as_ref().unwrap();
    assert_eq!(file.document_number, "24/9999-1");
    assert_eq!(file.source_id, "mainArchive");
}

#[tokio::test]
async fn empty_filter_returns_at_most_50_newest_first() {
    let log = audit_log().await;
    for i in 0..55 {
        log.append(overview_event("Kari Nordmann", "p-1", &format!("{}", i)))
            .await
            .unwrap();
    }

    let entries = log.query(&LogFilter::default()).await.unwrap();
    assert_eq!(entries.len(), 50);
    // Newest first: the last appended entry leads
    assert_eq!(entries[0].student.student_number, "54");
    assert_eq!(entries[49].student.student_number, "5");
}

#[tokio::test]
async fn filtered_query_is_unbounded() {
    let log = audit_log().await;
    for _ in 0..60 {
        log.append(overview_event("Kari Nordmann", "p-1", "42"))
            .await
            .unwrap();
    }
    log.append(overview_event("Kari Nordmann", "p-1", "43"))
        .await
        .unwrap();

    let filter = LogFilter {
        student_number: Some("42".to_string()),
        ..Default::default()
    };
    let entries = log.query(&filter).await.unwrap();
    assert_eq!(entries.len(), 60);
}

#[tokio::test]
async fn filter_fields_combine_with_and() {
    let log = audit_log().await;
    log.append(overview_event("Kari Nordmann", "p-1", "42"))
        .await
        .unwrap();
    log.append(overview_event("Ola Olsen", "p-2", "42"))
        .await
        .unwrap();

    let filter = LogFilter {
        student_number: Some("42".to_string()),
        principal_id: Some("p-2".to_string()),
        ..Default::default()
    };
    let entries = log.query(&filter).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user.name, "Ola Olsen");
}

#[tokio::test]
async fn student_search_is_prefix_deduplicated_and_sorted() {
    let log = audit_log().await;
    // Anna appears twice, dedup by student number
    for _ in 0..2 {
        log.append(AuditEvent {
            student: student("Anna Demo", "1"),
            ..overview_event("Kari Nordmann", "p-1", "1")
        })
        .await
        .unwrap();
    }
    log.append(AuditEvent {
        student: student("Annika Demo", "2"),
        ..overview_event("Kari Nordmann", "p-1", "2")
    })
    .await
    .unwrap();
    log.append(AuditEvent {
        student: student("Birk Demo", "3"),
        ..overview_event("Kari Nordmann", "p-1", "3")
    })
    .await
    .unwrap();

    let hits = log.search_students("an").await.unwrap();
    assert_eq!(
        hits,
        vec![
            StudentSummary {
                name: "Anna Demo".to_string(),
                student_number: "1".to_string(),
            },
            StudentSummary {
                name: "Annika Demo".to_string(),
                student_number: "2".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn student_search_is_capped_at_15() {
    let log = audit_log().await;
    for i in 0..20 {
        log.append(AuditEvent {
            student: student(&format!("Elev {:02}", i), &format!("{}", i)),
            ..overview_event("Kari Nordmann", "p-1", &format!("{}", i))
        })
        .await
        .unwrap();
    }

    let hits = log.search_students("Elev").await.unwrap();
    assert_eq!(hits.len(), 15);
    assert_eq!(hits[0].name, "Elev 00");
}

#[tokio::test]
async fn user_search_deduplicates_by_principal_id() {
    let log = audit_log().await;
    for student_number in ["1", "2", "3"] {
        log.append(overview_event("Kari Nordmann", "p-1", student_number))
            .await
            .unwrap();
    }
    log.append(overview_event("Knut Hansen", "p-2", "1"))
        .await
        .unwrap();

    let hits = log.search_users("K").await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].name, "Kari Nordmann");
    assert_eq!(hits[1].name, "Knut Hansen");
}

#[tokio::test]
async fn impersonation_snapshot_round_trips() {
    let log = audit_log().await;
    let mut event = overview_event("Admin Adminsen", "p-9", "42");
    event.user.has_admin_role = true;
    event.user.impersonating = Some(Impersonation {
        target: "kari@example.no".to_string(),
        kind: ImpersonationKind::Teacher,
    });
    log.append(event).await.unwrap();

    let entries = log.query(&LogFilter::default()).await.unwrap();
    let imp = entries[0].user.impersonating.as_ref().unwrap();
    assert_eq!(imp.target, "kari@example.no");
    assert_eq!(imp.kind, ImpersonationKind::Teacher);
}

#[tokio::test]
async fn incomplete_file_snapshot_is_rejected() {
    let log = audit_log().await;
    let mut event = file_event("24/9999-1");
    event.file.as_mut().unwrap().title = String::new();

    let result = log.append(event).await;
    assert!(result.is_err());

    // Nothing was written
    let entries = log.query(&LogFilter::default()).await.unwrap();
    assert!(entries.is_empty());
}
