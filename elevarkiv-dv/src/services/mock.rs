//! Mock collaborators
//!
//! Deterministic stand-ins for the roster source and the archive, used in
//! local development (config `mock_collaborators = true`) and in tests.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::info;

use crate::roster::types::{
    GroupStudent, RawGroup, RawSchool, RawTeacherRecord, RawTeachingRelationship, Subject,
};
use crate::services::archive_client::{
    ArchiveDocument, ArchiveError, ArchiveFile, DocumentContact, DocumentFile, DocumentList,
    MAIN_ARCHIVE_SOURCE_ID,
};

const MOCK_PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< >>\n%%EOF\n";

const MOCK_DOCUMENT_TITLES: [&str; 5] = [
    "Kompetansebevis",
    "Vitnemål",
    "Lærekontrakt",
    "IOP",
    "Dokumentasjon på bestått fagprøve",
];

/// Mock roster source
///
/// With fixed records it answers only for those teachers; without, it
/// synthesizes the demo roster for whichever teacher id is asked for.
pub struct MockRosterSource {
    records: Option<Vec<RawTeacherRecord>>,
}

impl MockRosterSource {
    /// Demo mode: every teacher id resolves to the synthetic roster
    pub fn synthetic() -> Self {
        Self { records: None }
    }

    /// Answer only for the given records (test use)
    pub fn with_records(records: Vec<RawTeacherRecord>) -> Self {
        Self {
            records: Some(records),
        }
    }

    pub fn teacher_record(&self, teacher_id: &str) -> Option<RawTeacherRecord> {
        match &self.records {
            Some(records) => records
                .iter()
                .find(|r| r.upn == teacher_id || r.login_handle == teacher_id)
                .cloned(),
            None => {
                info!(teacher = %teacher_id, "Mock roster source: synthesizing demo roster");
                Some(demo_record(teacher_id))
            }
        }
    }
}

fn demo_school(number: &str, short_name: &str, name: &str) -> RawSchool {
    RawSchool {
        school_number: number.to_string(),
        short_name: short_name.to_string(),
        name: name.to_string(),
    }
}

fn demo_student(number: &str, name: &str, first: &str, last: &str, contact: bool) -> GroupStudent {
    GroupStudent {
        student_number: number.to_string(),
        name: name.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        login_handle: Some(format!("{}{}@skole.example.no", first.to_lowercase(), number)),
        national_id: format!("010190{}", number),
        contact_teacher: contact,
    }
}

/// Demo roster: two schools, one contact-teacher student, one student
/// reachable only through a teaching group with an IOP course, one student
/// without a login handle and one relationship with a disallowed role
/// description.
fn demo_record(teacher_id: &str) -> RawTeacherRecord {
    let anna = demo_student("10001", "Anna Demo", "Anna", "Demo", true);
    let birk = demo_student("10002", "Birk Demo", "Birk", "Demo", false);
    let casper = demo_student("10003", "Casper Demo", "Casper", "Demo", false);
    let unprovisioned = GroupStudent {
        login_handle: None,
        ..demo_student("10004", "Dina Demo", "Dina", "Demo", false)
    };

    let main_relationship = RawTeachingRelationship {
        id: "demo-u1".to_string(),
        active: true,
        description: "Lektor".to_string(),
        school: demo_school("301", "UT-DEMVG", "Demo videregående skole"),
        base_groups: vec![RawGroup {
            id: "demo-9a".to_string(),
            name: "9A".to_string(),
            active: true,
            subjects: Vec::new(),
            students: vec![anna.clone(), birk.clone(), unprovisioned],
        }],
        contact_teacher_groups: Vec::new(),
        teaching_groups: vec![RawGroup {
            id: "demo-nor".to_string(),
            name: "9NOR".to_string(),
            active: true,
            subjects: vec![Subject {
                id: "fag-NOR1001".to_string(),
                code: "NOR1001".to_string(),
            }],
            students: vec![anna, birk],
        }],
    };

    let iop_relationship = RawTeachingRelationship {
        id: "demo-u2".to_string(),
        active: true,
        description: "Adjunkt".to_string(),
        school: demo_school("302", "UT-ANNVG", "Annen videregående skole"),
        base_groups: Vec::new(),
        contact_teacher_groups: Vec::new(),
        teaching_groups: vec![RawGroup {
            id: "demo-iop".to_string(),
            name: "IOPGR".to_string(),
            active: true,
            subjects: vec![Subject {
                id: "fag-IOP1000".to_string(),
                code: "IOP1000".to_string(),
            }],
            students: vec![casper],
        }],
    };

    let rejected_relationship = RawTeachingRelationship {
        id: "demo-u3".to_string(),
        active: true,
        description: "Vikar".to_string(),
        school: demo_school("301", "UT-DEMVG", "Demo videregående skole"),
        base_groups: vec![RawGroup {
            id: "demo-8b".to_string(),
            name: "8B".to_string(),
            active: true,
            subjects: Vec::new(),
            students: vec![demo_student("10005", "Erle Demo", "Erle", "Demo", false)],
        }],
        contact_teacher_groups: Vec::new(),
        teaching_groups: Vec::new(),
    };

    RawTeacherRecord {
        upn: teacher_id.to_string(),
        login_handle: teacher_id.to_string(),
        employee_number: "700001".to_string(),
        name: "Demo Lærer".to_string(),
        first_name: "Demo".to_string(),
        last_name: "Lærer".to_string(),
        relationships: vec![main_relationship, iop_relationship, rejected_relationship],
    }
}

/// Mock archive with a deterministic document set
pub struct MockArchive;

impl MockArchive {
    pub fn list_documents(&self, student_login: &str) -> DocumentList {
        let documents = (0..5)
            .map(|i| {
                let title = MOCK_DOCUMENT_TITLES[i % MOCK_DOCUMENT_TITLES.len()];
                ArchiveDocument {
                    title: title.to_string(),
                    student_login: student_login.to_string(),
                    source_id: MAIN_ARCHIVE_SOURCE_ID.to_string(),
                    source_name: "Hovedarkiv (mock)".to_string(),
                    document_number: format!("24/00123-{}", i + 1),
                    document_date: format!("2024-0{}-10T00:00:00", i + 3),
                    responsible_enterprise: "Seksjon for demo".to_string(),
                    category: "Dokument inn".to_string(),
                    archive_part: "Elevdokument".to_string(),
                    access_code: "Offl § 13".to_string(),
                    contacts: vec![DocumentContact {
                        name: "Demo Saksbehandler".to_string(),
                        role: "Avsender".to_string(),
                    }],
                    files: vec![
                        DocumentFile {
                            id: format!("9000{}", i + 1),
                            title: format!("{}.pdf", title),
                            relation: "Hoveddokument".to_string(),
                            format: "PDF".to_string(),
                            is_available: true,
                            can_view: false,
                        },
                        DocumentFile {
                            id: format!("9100{}", i + 1),
                            title: "Vedlegg.docx".to_string(),
                            relation: "Vedlegg".to_string(),
                            format: "DOCX".to_string(),
                            is_available: false,
                            can_view: false,
                        },
                    ],
                }
            })
            .collect();

        DocumentList {
            documents,
            errors: vec!["Simulert feil fra sekundær arkivkilde".to_string()],
        }
    }

    pub fn fetch_file(&self, file_id: &str) -> Result<ArchiveFile, ArchiveError> {
        if file_id.is_empty() {
            return Err(ArchiveError::FileNotFound(file_id.to_string()));
        }
        Ok(ArchiveFile {
            content: STANDARD.encode(MOCK_PDF),
            title: "Testdokument.pdf".to_string(),
            document_number: "24/00123-1".to_string(),
        })
    }
}
