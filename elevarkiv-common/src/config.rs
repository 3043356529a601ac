//! Configuration loading
//!
//! Values resolve in priority order: command-line argument (handled by the
//! binary), environment variable, TOML config file, compiled default.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Domain appended to student login prefixes from the transport layer
    /// (e.g. `skole.example.no` turns `ola123` into `ola123@skole.example.no`)
    pub login_domain: String,
    /// Active-role value identifying a regular teacher
    pub teacher_role: String,
    /// Active-role value identifying a leader
    pub leader_role: String,
    /// When true, every teacher may open files for their students
    pub faglarer_access_enabled: bool,
    /// When true, subject teachers get file access via IOP-qualifying classes
    pub iop_access_enabled: bool,
    /// Serve deterministic mock roster/archive data instead of calling out
    pub mock_collaborators: bool,
    pub roster_base_url: String,
    pub roster_token: String,
    pub archive_base_url: String,
    pub archive_token: String,
    /// Display name of the main archive source attached to repacked documents
    pub archive_source_name: String,
    pub impersonation_ttl_secs: u64,
}

/// Optional subset read from the TOML config file
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    database_path: Option<PathBuf>,
    login_domain: Option<String>,
    teacher_role: Option<String>,
    leader_role: Option<String>,
    faglarer_access_enabled: Option<bool>,
    iop_access_enabled: Option<bool>,
    mock_collaborators: Option<bool>,
    roster_base_url: Option<String>,
    roster_token: Option<String>,
    archive_base_url: Option<String>,
    archive_token: Option<String>,
    archive_source_name: Option<String>,
    impersonation_ttl_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5780,
            database_path: default_database_path(),
            login_domain: "skole.example.no".to_string(),
            teacher_role: "larer".to_string(),
            leader_role: "leder".to_string(),
            faglarer_access_enabled: false,
            iop_access_enabled: false,
            mock_collaborators: false,
            roster_base_url: String::new(),
            roster_token: String::new(),
            archive_base_url: String::new(),
            archive_token: String::new(),
            archive_source_name: "Hovedarkiv".to_string(),
            impersonation_ttl_secs: 3600,
        }
    }
}

impl Config {
    /// Load configuration: defaults, overlaid by the TOML file (explicit
    /// path or the platform config directory), overlaid by environment
    /// variables.
    pub fn load(config_file: Option<&PathBuf>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(file) = locate_config_file(config_file)? {
            let content = std::fs::read_to_string(&file)?;
            let file_config: FileConfig = toml::from_str(&content)
                .map_err(|e| Error::Config(format!("{}: {}", file.display(), e)))?;
            config.apply_file(file_config);
        }

        config.apply_env();
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        macro_rules! take {
            ($field:ident) => {
                if let Some(value) = file.$field {
                    self.$field = value;
                }
            };
        }
        take!(host);
        take!(port);
        take!(database_path);
        take!(login_domain);
        take!(teacher_role);
        take!(leader_role);
        take!(faglarer_access_enabled);
        take!(iop_access_enabled);
        take!(mock_collaborators);
        take!(roster_base_url);
        take!(roster_token);
        take!(archive_base_url);
        take!(archive_token);
        take!(archive_source_name);
        take!(impersonation_ttl_secs);
    }

    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("ELEVARKIV_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("ELEVARKIV_PORT") {
            if let Ok(port) = port.parse() {
                self.port = port;
            }
        }
        if let Ok(path) = std::env::var("ELEVARKIV_DB_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Ok(domain) = std::env::var("ELEVARKIV_LOGIN_DOMAIN") {
            self.login_domain = domain;
        }
        if let Ok(role) = std::env::var("ELEVARKIV_TEACHER_ROLE") {
            self.teacher_role = role;
        }
        if let Ok(role) = std::env::var("ELEVARKIV_LEADER_ROLE") {
            self.leader_role = role;
        }
        if let Ok(flag) = std::env::var("FAGLARER_ACCESS_ENABLED") {
            self.faglarer_access_enabled = flag == "true";
        }
        if let Ok(flag) = std::env::var("IOP_FAGLARER_ACCESS_ENABLED") {
            self.iop_access_enabled = flag == "true";
        }
        if let Ok(flag) = std::env::var("ELEVARKIV_MOCK") {
            self.mock_collaborators = flag == "true";
        }
        if let Ok(url) = std::env::var("ELEVARKIV_ROSTER_URL") {
            self.roster_base_url = url;
        }
        if let Ok(token) = std::env::var("ELEVARKIV_ROSTER_TOKEN") {
            self.roster_token = token;
        }
        if let Ok(url) = std::env::var("ELEVARKIV_ARCHIVE_URL") {
            self.archive_base_url = url;
        }
        if let Ok(token) = std::env::var("ELEVARKIV_ARCHIVE_TOKEN") {
            self.archive_token = token;
        }
        if let Ok(name) = std::env::var("ELEVARKIV_ARCHIVE_SOURCE_NAME") {
            self.archive_source_name = name;
        }
        if let Ok(ttl) = std::env::var("ELEVARKIV_IMPERSONATION_TTL_SECS") {
            if let Ok(ttl) = ttl.parse() {
                self.impersonation_ttl_secs = ttl;
            }
        }
    }
}

/// Explicit path wins; otherwise look in the platform config directory.
/// A missing default file is not an error, a missing explicit file is.
fn locate_config_file(explicit: Option<&PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path.clone()));
    }

    let default = dirs::config_dir().map(|d| d.join("elevarkiv").join("config.toml"));
    match default {
        Some(path) if path.exists() => Ok(Some(path)),
        _ => Ok(None),
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("elevarkiv").join("elevarkiv.db"))
        .unwrap_or_else(|| PathBuf::from("./elevarkiv.db"))
}
