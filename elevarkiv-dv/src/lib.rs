//! elevarkiv-dv library - Document Viewer service
//!
//! Lets teachers and leaders view archived documents for students they
//! teach. Every access decision is written to an append-only audit log
//! partitioned per school year.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, put};
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use elevarkiv_common::config::Config;
use elevarkiv_common::{Error, Result};

pub mod access;
pub mod api;
pub mod audit;
pub mod docs;
pub mod error;
pub mod impersonation;
pub mod roster;
pub mod services;

use audit::AuditLog;
use impersonation::ImpersonationStore;
use services::archive_client::HttpArchiveClient;
use services::mock::{MockArchive, MockRosterSource};
use services::roster_client::HttpRosterSource;
use services::{ArchiveClient, RosterSource};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub roster: Arc<RosterSource>,
    pub archive: Arc<ArchiveClient>,
    pub audit: Arc<AuditLog>,
    pub impersonation: Arc<ImpersonationStore>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create application state; collaborator clients are mock or HTTP
    /// depending on configuration
    pub fn new(pool: SqlitePool, config: Config) -> Result<Self> {
        let (roster, archive) = if config.mock_collaborators {
            (
                RosterSource::Mock(MockRosterSource::synthetic()),
                ArchiveClient::Mock(MockArchive),
            )
        } else {
            (
                RosterSource::Http(HttpRosterSource::new(
                    config.roster_base_url.clone(),
                    config.roster_token.clone(),
                )?),
                ArchiveClient::Http(
                    HttpArchiveClient::new(
                        config.archive_base_url.clone(),
                        config.archive_token.clone(),
                        config.archive_source_name.clone(),
                    )
                    .map_err(|e| Error::Upstream(e.to_string()))?,
                ),
            )
        };

        let impersonation = ImpersonationStore::new(Duration::from_secs(
            config.impersonation_ttl_secs,
        ));

        Ok(Self {
            config: Arc::new(config),
            roster: Arc::new(roster),
            archive: Arc::new(archive),
            audit: Arc::new(AuditLog::new(pool)),
            impersonation: Arc::new(impersonation),
            startup_time: Utc::now(),
        })
    }

    /// State wired to explicit collaborators (test use)
    pub fn with_collaborators(
        pool: SqlitePool,
        config: Config,
        roster: RosterSource,
        archive: ArchiveClient,
    ) -> Self {
        let impersonation = ImpersonationStore::new(Duration::from_secs(
            config.impersonation_ttl_secs,
        ));
        Self {
            config: Arc::new(config),
            roster: Arc::new(roster),
            archive: Arc::new(archive),
            audit: Arc::new(AuditLog::new(pool)),
            impersonation: Arc::new(impersonation),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/userdata", get(api::userdata::get_userdata))
        .route(
            "/api/students/:student_prefix/documents",
            get(api::students::list_documents),
        )
        .route(
            "/api/students/:student_prefix/sources/:source_id/files/:file_id",
            get(api::students::get_file),
        )
        .route("/api/system", get(api::system::system_info))
        .route("/api/admin/logentries", get(api::admin::log_entries))
        .route("/api/admin/logstudents", get(api::admin::log_students))
        .route("/api/admin/logusers", get(api::admin::log_users))
        .route(
            "/api/admin/impersonation",
            put(api::admin::set_impersonation).delete(api::admin::clear_impersonation),
        )
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
