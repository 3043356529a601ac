//! Append-only access audit log
//!
//! Every access decision produces one immutable entry. Entries are
//! partitioned into one table per school year (boundary July 15) and are
//! write-once: no update or delete path exists. Read paths are a filtered
//! lookup (student number / principal id / document number), a distinct-name
//! search for autocomplete and a default recent-entries listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use elevarkiv_common::school_year::school_year_for;
use elevarkiv_common::{Error, Result};

use crate::access::{AccessReason, Caller, Impersonation};
use crate::roster::Student;

/// Caller identity as it was at decision time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub principal_id: String,
    pub principal_name: String,
    pub name: String,
    pub role: String,
    pub has_admin_role: bool,
    pub impersonating: Option<Impersonation>,
}

impl UserSnapshot {
    pub fn of(caller: &Caller) -> Self {
        Self {
            principal_id: caller.principal_id.clone(),
            principal_name: caller.principal_name.clone(),
            name: caller.name.clone(),
            role: caller.active_role.clone(),
            has_admin_role: caller.has_admin_role,
            impersonating: caller.impersonating.clone(),
        }
    }
}

/// Student identity as it was at decision time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSnapshot {
    pub name: String,
    pub login_handle: String,
    pub student_number: String,
}

impl StudentSnapshot {
    pub fn of(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            login_handle: student.login_handle.clone(),
            student_number: student.student_number.clone(),
        }
    }
}

/// File the access concerned, when a single file was opened
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub id: String,
    pub title: String,
    pub document_number: String,
    pub source_id: String,
}

/// Input to [`AuditLog::append`]
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub user: UserSnapshot,
    pub student: StudentSnapshot,
    pub access_reason: AccessReason,
    pub action: String,
    pub file: Option<FileSnapshot>,
}

/// A stored audit entry
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user: UserSnapshot,
    pub student: StudentSnapshot,
    pub access_reason: AccessReason,
    pub action: String,
    pub file: Option<FileSnapshot>,
}

/// Filter for [`AuditLog::query`]; empty means "50 most recent"
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub student_number: Option<String>,
    pub principal_id: Option<String>,
    pub document_number: Option<String>,
}

impl LogFilter {
    pub fn is_empty(&self) -> bool {
        self.student_number.is_none()
            && self.principal_id.is_none()
            && self.document_number.is_none()
    }
}

/// Distinct student hit from the name search
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StudentSummary {
    pub name: String,
    pub student_number: String,
}

/// Distinct user hit from the name search
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub name: String,
    pub principal_id: String,
}

/// Autocomplete results are capped; filtered lookups are not
const SEARCH_LIMIT: i64 = 15;
const RECENT_LIMIT: i64 = 50;

pub struct AuditLog {
    pool: SqlitePool,
}

impl AuditLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Partition table for entries stamped at `timestamp`
    pub fn partition_for(timestamp: DateTime<Utc>) -> String {
        format!("access_log_{}", school_year_for(timestamp, "_"))
    }

    /// Append one immutable entry. The id and timestamp are assigned here;
    /// a storage fault is fatal for the calling request, since an unaudited
    /// access grant would be a correctness violation.
    pub async fn append(&self, event: AuditEvent) -> Result<AccessLogEntry> {
        validate_event(&event)?;

        let entry = AccessLogEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            user: event.user,
            student: event.student,
            access_reason: event.access_reason,
            action: event.action,
            file: event.file,
        };

        let table = Self::partition_for(entry.timestamp);
        self.ensure_partition(&table).await?;

        let (impersonating_target, impersonating_kind) = match &entry.user.impersonating {
            Some(imp) => (Some(imp.target.clone()), Some(imp.kind.as_str().to_string())),
            None => (None, None),
        };
        let file = entry.file.as_ref();

        sqlx::query(&format!(
            "INSERT INTO {} (
                id, timestamp,
                principal_id, principal_name, user_name, user_role, has_admin_role,
                impersonating_target, impersonating_kind,
                student_name, student_login, student_number,
                access_reason, action,
                file_id, file_title, file_document_number, file_source_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            table
        ))
        .bind(&entry.id)
        .bind(entry.timestamp.to_rfc3339())
        .bind(&entry.user.principal_id)
        .bind(&entry.user.principal_name)
        .bind(&entry.user.name)
        .bind(&entry.user.role)
        .bind(entry.user.has_admin_role)
        .bind(&impersonating_target)
        .bind(&impersonating_kind)
        .bind(&entry.student.name)
        .bind(&entry.student.login_handle)
        .bind(&entry.student.student_number)
        .bind(entry.access_reason.as_str())
        .bind(&entry.action)
        .bind(file.map(|f| f.id.clone()))
        .bind(file.map(|f| f.title.clone()))
        .bind(file.map(|f| f.document_number.clone()))
        .bind(file.map(|f| f.source_id.clone()))
        .execute(&self.pool)
        .await?;

        info!(entry = %entry.id, action = %entry.action, "Audit entry written");
        Ok(entry)
    }

    /// Filtered lookup against the current school-year partition.
    ///
    /// An empty filter returns the 50 most recent entries; any filter field
    /// set returns all matches, unbounded. Both newest first.
    pub async fn query(&self, filter: &LogFilter) -> Result<Vec<AccessLogEntry>> {
        let table = Self::partition_for(Utc::now());
        self.ensure_partition(&table).await?;

        let mut conditions: Vec<&str> = Vec::new();
        if filter.student_number.is_some() {
            conditions.push("student_number = ?");
        }
        if filter.principal_id.is_some() {
            conditions.push("principal_id = ?");
        }
        if filter.document_number.is_some() {
            conditions.push("file_document_number = ?");
        }

        let sql = if conditions.is_empty() {
            format!(
                "SELECT * FROM {} ORDER BY rowid DESC LIMIT {}",
                table, RECENT_LIMIT
            )
        } else {
            format!(
                "SELECT * FROM {} WHERE {} ORDER BY rowid DESC",
                table,
                conditions.join(" AND ")
            )
        };

        let mut query = sqlx::query(&sql);
        for value in [
            &filter.student_number,
            &filter.principal_id,
            &filter.document_number,
        ]
        .into_iter()
        .flatten()
        {
            query = query.bind(value);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(entry_from_row).collect()
    }

    /// Distinct students whose stored display name starts with `prefix`
    /// (case-insensitive), alphabetical, capped at 15
    pub async fn search_students(&self, prefix: &str) -> Result<Vec<StudentSummary>> {
        let table = Self::partition_for(Utc::now());
        self.ensure_partition(&table).await?;

        let rows = sqlx::query(&format!(
            "SELECT student_name, student_number FROM {}
             WHERE student_name LIKE ? ESCAPE '\\'
             GROUP BY student_number
             ORDER BY student_name ASC
             LIMIT {}",
            table, SEARCH_LIMIT
        ))
        .bind(prefix_pattern(prefix))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| StudentSummary {
                name: row.get("student_name"),
                student_number: row.get("student_number"),
            })
            .collect())
    }

    /// Distinct users whose stored display name starts with `prefix`
    /// (case-insensitive), alphabetical, capped at 15
    pub async fn search_users(&self, prefix: &str) -> Result<Vec<UserSummary>> {
        let table = Self::partition_for(Utc::now());
        self.ensure_partition(&table).await?;

        let rows = sqlx::query(&format!(
            "SELECT user_name, principal_id FROM {}
             WHERE user_name LIKE ? ESCAPE '\\'
             GROUP BY principal_id
             ORDER BY user_name ASC
             LIMIT {}",
            table, SEARCH_LIMIT
        ))
        .bind(prefix_pattern(prefix))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| UserSummary {
                name: row.get("user_name"),
                principal_id: row.get("principal_id"),
            })
            .collect())
    }

    /// Idempotent partition creation. Partition names are derived from
    /// numeric school years, never from request input.
    async fn ensure_partition(&self, table: &str) -> Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                principal_id TEXT NOT NULL,
                principal_name TEXT NOT NULL,
                user_name TEXT NOT NULL,
                user_role TEXT NOT NULL,
                has_admin_role INTEGER NOT NULL,
                impersonating_target TEXT,
                impersonating_kind TEXT,
                student_name TEXT NOT NULL,
                student_login TEXT NOT NULL,
                student_number TEXT NOT NULL,
                access_reason TEXT NOT NULL,
                action TEXT NOT NULL,
                file_id TEXT,
                file_title TEXT,
                file_document_number TEXT,
                file_source_id TEXT
            )",
            table
        ))
        .execute(&self.pool)
        .await?;

        for (suffix, column) in [
            ("student", "student_number"),
            ("principal", "principal_id"),
            ("document", "file_document_number"),
        ] {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {} ({})",
                table, suffix, table, column
            ))
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}

fn validate_event(event: &AuditEvent) -> Result<()> {
    if event.action.is_empty() {
        return Err(Error::InvalidInput("audit event has no action".to_string()));
    }
    if let Some(file) = &event.file {
        if file.id.is_empty()
            || file.title.is_empty()
            || file.document_number.is_empty()
            || file.source_id.is_empty()
        {
            return Err(Error::InvalidInput(
                "audit event file snapshot is incomplete".to_string(),
            ));
        }
    }
    Ok(())
}

/// SQLite LIKE is case-insensitive for ASCII; escape the pattern
/// metacharacters so the prefix is matched literally.
fn prefix_pattern(prefix: &str) -> String {
    let escaped = prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{}%", escaped)
}

fn entry_from_row(row: &SqliteRow) -> Result<AccessLogEntry> {
    let timestamp: String = row.get("timestamp");
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| Error::Internal(format!("bad timestamp in audit entry: {}", e)))?
        .with_timezone(&Utc);

    let reason: String = row.get("access_reason");
    let access_reason = reason.parse::<AccessReason>().map_err(Error::Internal)?;

    let impersonating = match (
        row.get::<Option<String>, _>("impersonating_target"),
        row.get::<Option<String>, _>("impersonating_kind"),
    ) {
        (Some(target), Some(kind)) => Some(Impersonation {
            target,
            kind: kind.parse().map_err(Error::Internal)?,
        }),
        _ => None,
    };

    let file = match row.get::<Option<String>, _>("file_id") {
        Some(id) => Some(FileSnapshot {
            id,
            title: row.get("file_title"),
            document_number: row.get("file_document_number"),
            source_id: row.get("file_source_id"),
        }),
        None => None,
    };

    Ok(AccessLogEntry {
        id: row.get("id"),
        timestamp,
        user: UserSnapshot {
            principal_id: row.get("principal_id"),
            principal_name: row.get("principal_name"),
            name: row.get("user_name"),
            role: row.get("user_role"),
            has_admin_role: row.get::<i64, _>("has_admin_role") != 0,
            impersonating,
        },
        student: StudentSnapshot {
            name: row.get("student_name"),
            login_handle: row.get("student_login"),
            student_number: row.get("student_number"),
        },
        access_reason,
        action: row.get("action"),
        file,
    })
}
