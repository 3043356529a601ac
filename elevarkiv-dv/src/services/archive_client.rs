//! Document archive client
//!
//! Talks to the archive gateway: student folder lookup, document listing
//! and single-file retrieval. Upstream payloads are repacked to the
//! projection the rest of the service consumes.
//!
//! Listing is partial-failure tolerant: per-phase failures land in the
//! `errors` list next to whatever documents other phases produced.
//! Single-file retrieval is all-or-nothing.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::services::mock::MockArchive;

/// Source id of the main archive, as exposed to the transport layer
pub const MAIN_ARCHIVE_SOURCE_ID: &str = "mainArchive";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Case statuses that make a student folder eligible
const ALLOWED_CASE_STATUSES: [&str; 2] = ["Under behandling", "Avsluttet"];

/// Journal status codes that make a document visible
const ALLOWED_DOCUMENT_STATUS_CODES: [&str; 4] = ["J", "F", "E", "A"];

/// Archive client errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Archive error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

/// Documents retrieved for one student, with partial errors
#[derive(Debug, Clone, Serialize)]
pub struct DocumentList {
    pub documents: Vec<ArchiveDocument>,
    pub errors: Vec<String>,
}

/// Archive document reduced to the fields the service exposes
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveDocument {
    pub title: String,
    pub student_login: String,
    pub source_id: String,
    pub source_name: String,
    pub document_number: String,
    pub document_date: String,
    pub responsible_enterprise: String,
    pub category: String,
    pub archive_part: String,
    pub access_code: String,
    pub contacts: Vec<DocumentContact>,
    pub files: Vec<DocumentFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentContact {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentFile {
    pub id: String,
    pub title: String,
    pub relation: String,
    pub format: String,
    /// Only PDF files can be rendered by the viewer
    pub is_available: bool,
    /// Set by the access façade from the access decision
    pub can_view: bool,
}

/// A retrieved file with its metadata
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    /// Base64-encoded file content
    pub content: String,
    pub title: String,
    pub document_number: String,
}

/// Archive backend selected at startup
pub enum ArchiveClient {
    Http(HttpArchiveClient),
    Mock(MockArchive),
}

impl ArchiveClient {
    pub async fn list_documents(
        &self,
        national_id: &str,
        student_login: &str,
    ) -> Result<DocumentList, ArchiveError> {
        match self {
            ArchiveClient::Http(client) => client.list_documents(national_id, student_login).await,
            ArchiveClient::Mock(mock) => Ok(mock.list_documents(student_login)),
        }
    }

    pub async fn fetch_file(&self, file_id: &str) -> Result<ArchiveFile, ArchiveError> {
        match self {
            ArchiveClient::Http(client) => client.fetch_file(file_id).await,
            ArchiveClient::Mock(mock) => mock.fetch_file(file_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Upstream payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawCase {
    case_number: String,
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawDocument {
    title: String,
    document_number: String,
    document_date: Option<String>,
    journal_date: Option<String>,
    status_code: String,
    responsible_enterprise_name: Option<String>,
    category: RawDescribed,
    document_archive: RawDescribed,
    access_code_description: Option<String>,
    #[serde(default)]
    contacts: Vec<RawContact>,
    #[serde(default)]
    files: Vec<RawFileEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawDescribed {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawContact {
    search_name: Option<String>,
    role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawFileEntry {
    recno: i64,
    title: String,
    format: String,
    relation_type_description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawFileWithData {
    base64_data: Option<String>,
    title: String,
    document_number: String,
}

/// Reduce an upstream document to the exposed projection
fn repack_document(
    document: RawDocument,
    student_login: &str,
    source_name: &str,
) -> ArchiveDocument {
    let document_date = document
        .document_date
        .or(document.journal_date)
        .unwrap_or_else(|| "Ukjent dato".to_string());

    ArchiveDocument {
        title: document.title,
        student_login: student_login.to_string(),
        source_id: MAIN_ARCHIVE_SOURCE_ID.to_string(),
        source_name: source_name.to_string(),
        document_number: document.document_number,
        document_date,
        responsible_enterprise: document
            .responsible_enterprise_name
            .unwrap_or_else(|| "Ukjent ansvarlig virksomhet".to_string()),
        category: document
            .category
            .description
            .unwrap_or_else(|| "Ukjent kategori".to_string()),
        archive_part: document
            .document_archive
            .description
            .unwrap_or_else(|| "Ukjent dokumentarkiv".to_string()),
        access_code: document
            .access_code_description
            .unwrap_or_else(|| "Ukjent tilgangskode".to_string()),
        contacts: document
            .contacts
            .into_iter()
            .map(|contact| DocumentContact {
                name: contact.search_name.unwrap_or_else(|| "Ukjent".to_string()),
                role: contact.role,
            })
            .collect(),
        files: document.files.into_iter().map(repack_file).collect(),
    }
}

fn repack_file(file: RawFileEntry) -> DocumentFile {
    let format_suffix = file.format.to_lowercase();
    let title = if file.title.to_lowercase().ends_with(&format_suffix) {
        file.title
    } else {
        format!("{}.{}", file.title, format_suffix)
    };

    DocumentFile {
        id: file.recno.to_string(),
        title,
        relation: file.relation_type_description,
        format: file.format.clone(),
        is_available: file.format.eq_ignore_ascii_case("pdf"),
        can_view: false,
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// HTTP client against the archive gateway
pub struct HttpArchiveClient {
    http_client: reqwest::Client,
    base_url: String,
    token: String,
    source_name: String,
}

impl HttpArchiveClient {
    pub fn new(base_url: String, token: String, source_name: String) -> Result<Self, ArchiveError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ArchiveError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            token,
            source_name,
        })
    }

    async fn call(&self, payload: serde_json::Value) -> Result<reqwest::Response, ArchiveError> {
        let response = self
            .http_client
            .post(format!("{}/archive", self.base_url))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ArchiveError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArchiveError::Api(status.as_u16(), body));
        }
        Ok(response)
    }

    /// Look up the student folder(s), then the documents in each folder.
    ///
    /// Both phases record failures in the `errors` list instead of
    /// aborting; a missing folder is reported the same way.
    pub async fn list_documents(
        &self,
        national_id: &str,
        student_login: &str,
    ) -> Result<DocumentList, ArchiveError> {
        let mut result = DocumentList {
            documents: Vec::new(),
            errors: Vec::new(),
        };

        let mut case_numbers = Vec::new();
        match self.student_folder_cases(national_id).await {
            Ok(cases) => {
                let eligible: Vec<RawCase> = cases
                    .into_iter()
                    .filter(|c| ALLOWED_CASE_STATUSES.contains(&c.status.as_str()))
                    .collect();
                if eligible.is_empty() {
                    warn!(student = %student_login, "No student folder found in archive");
                    result.errors.push("Fant ingen elevmappe i arkivet".to_string());
                    return Ok(result);
                }
                if eligible.len() > 1 {
                    info!(student = %student_login, count = eligible.len(), "Student has several folders");
                }
                case_numbers.extend(eligible.into_iter().map(|c| c.case_number));
            }
            Err(e) => {
                warn!(student = %student_login, error = %e, "Student folder lookup failed");
                result
                    .errors
                    .push(format!("Feilet ved henting av elevmappe: {}", e));
            }
        }

        for case_number in case_numbers {
            match self.case_documents(&case_number).await {
                Ok(documents) => {
                    let visible = documents.into_iter().filter(|doc| {
                        ALLOWED_DOCUMENT_STATUS_CODES.contains(&doc.status_code.as_str())
                    });
                    result.documents.extend(
                        visible.map(|doc| repack_document(doc, student_login, &self.source_name)),
                    );
                }
                Err(e) => {
                    warn!(case = %case_number, error = %e, "Document listing failed for case");
                    result.errors.push(format!(
                        "Feilet ved henting av dokumenter for sak {}: {}",
                        case_number, e
                    ));
                }
            }
        }

        Ok(result)
    }

    async fn student_folder_cases(&self, national_id: &str) -> Result<Vec<RawCase>, ArchiveError> {
        let payload = json!({
            "service": "CaseService",
            "method": "GetCases",
            "parameter": {
                "Title": "Elevmappe",
                "CaseType": "Elev",
                "ContactReferenceNumber": national_id,
            }
        });
        let response = self.call(payload).await?;
        response
            .json()
            .await
            .map_err(|e| ArchiveError::Parse(e.to_string()))
    }

    async fn case_documents(&self, case_number: &str) -> Result<Vec<RawDocument>, ArchiveError> {
        let payload = json!({
            "service": "DocumentService",
            "method": "GetDocuments",
            "parameter": {
                "CaseNumber": case_number,
            }
        });
        let response = self.call(payload).await?;
        response
            .json()
            .await
            .map_err(|e| ArchiveError::Parse(e.to_string()))
    }

    /// All-or-nothing retrieval of one file with its metadata
    pub async fn fetch_file(&self, file_id: &str) -> Result<ArchiveFile, ArchiveError> {
        let payload = json!({
            "service": "FileService",
            "method": "GetFileWithMetadata",
            "parameter": {
                "Recno": file_id,
                "IncludeFileData": true,
            }
        });
        let response = self.call(payload).await?;
        let file: RawFileWithData = response
            .json()
            .await
            .map_err(|e| ArchiveError::Parse(e.to_string()))?;

        let content = file
            .base64_data
            .ok_or_else(|| ArchiveError::FileNotFound(file_id.to_string()))?;

        Ok(ArchiveFile {
            content,
            title: file.title,
            document_number: file.document_number,
        })
    }
}
