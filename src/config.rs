use std::path::PathBuf;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::entity::Presentation;
use crate::error::{NotesError, Result};
use crate::storage::DEFAULT_DB_PATH;

/// How update/delete report ids that are malformed or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdErrorPolicy {
    /// 409 Conflict for both, as historical clients expect.
    #[default]
    Legacy,
    /// Same errors as the read paths: 404 for both.
    Unified,
}

impl std::fmt::Display for IdErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdErrorPolicy::Legacy => write!(f, "legacy"),
            IdErrorPolicy::Unified => write!(f, "unified"),
        }
    }
}

impl std::str::FromStr for IdErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(IdErrorPolicy::Legacy),
            "unified" => Ok(IdErrorPolicy::Unified),
            _ => Err(format!("Invalid id error policy: {}", s)),
        }
    }
}

/// Behaviour switches for the note service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub id_errors: IdErrorPolicy,
    /// Bump `changed` on updates that change nothing.
    pub touch_on_noop: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            id_errors: IdErrorPolicy::Legacy,
            touch_on_noop: true,
        }
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Offset used to render display timestamps, in whole hours east of UTC.
    pub display_offset_hours: i32,
    pub timestamps: Presentation,
    pub service: ServiceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            display_offset_hours: 3,
            timestamps: Presentation::Display,
            service: ServiceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` to bind; the host may be a name that needs resolving.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn display_offset(&self) -> Result<FixedOffset> {
        display_offset(self.display_offset_hours)
    }
}

pub fn display_offset(hours: i32) -> Result<FixedOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| NotesError::InvalidInput(format!("invalid display offset: {}h", hours)))
}
