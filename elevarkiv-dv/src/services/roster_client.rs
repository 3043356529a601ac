//! Roster source client
//!
//! Fetches the raw teacher record (identity fields plus teaching
//! relationships) from the upstream roster service. Absence of a teacher
//! is a regular outcome, not an error.

use std::time::Duration;

use elevarkiv_common::{Error, Result};
use tracing::debug;

use crate::roster::RawTeacherRecord;
use crate::services::mock::MockRosterSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Roster source selected at startup
pub enum RosterSource {
    Http(HttpRosterSource),
    Mock(MockRosterSource),
}

impl RosterSource {
    /// Zero-or-one teacher record for `teacher_id`
    pub async fn teacher_record(&self, teacher_id: &str) -> Result<Option<RawTeacherRecord>> {
        match self {
            RosterSource::Http(client) => client.teacher_record(teacher_id).await,
            RosterSource::Mock(mock) => Ok(mock.teacher_record(teacher_id)),
        }
    }
}

/// HTTP client against the roster service
pub struct HttpRosterSource {
    http_client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpRosterSource {
    pub fn new(base_url: String, token: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Upstream(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            token,
        })
    }

    pub async fn teacher_record(&self, teacher_id: &str) -> Result<Option<RawTeacherRecord>> {
        let url = format!("{}/teachers/{}", self.base_url, teacher_id);
        debug!(teacher = %teacher_id, "Fetching teacher record from roster source");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("roster source: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            // No such teacher - a regular outcome
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "roster source returned {}",
                response.status()
            )));
        }

        let record: RawTeacherRecord = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("roster source payload: {}", e)))?;

        Ok(Some(record))
    }
}
