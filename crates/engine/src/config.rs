//! Roster configuration
//!
//! Fixed identifiers (membership role, log channels) and storage settings,
//! injected into the engine and the dispatcher at construction.

use std::path::{Path, PathBuf};

use roster_bus::LogChannels;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`RosterConfig::database_url`]
pub const DATABASE_URL_ENV: &str = "ROSTER_DATABASE_URL";

/// Configuration for the roster engine and its side effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Role revoked on ban/escalation and restored on unban
    #[serde(default)]
    pub member_role_id: String,

    /// Destination channel per mutating operation
    #[serde(default)]
    pub log_channels: LogChannels,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Optional JSONL audit journal of published outcomes
    #[serde(default)]
    pub journal_path: Option<PathBuf>,

    /// Capacity of the outcome broadcast channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_database_url() -> String {
    "sqlite:roster.db?mode=rwc".to_string()
}

fn default_event_buffer() -> usize {
    256
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            member_role_id: String::new(),
            log_channels: LogChannels::default(),
            database_url: default_database_url(),
            journal_path: None,
            event_buffer: default_event_buffer(),
        }
    }
}

impl RosterConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// File if given, defaults otherwise, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, std::io::Error> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_database_url(std::env::var(DATABASE_URL_ENV).ok())
    }

    fn with_database_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.database_url = url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_bus::OperationKind;

    #[test]
    fn test_default_config() {
        let config = RosterConfig::default();

        assert_eq!(config.database_url, "sqlite:roster.db?mode=rwc");
        assert_eq!(config.event_buffer, 256);
        assert!(config.journal_path.is_none());
        assert!(config.member_role_id.is_empty());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        std::fs::write(
            &path,
            r#"{
                "member_role_id": "ROLE-1",
                "log_channels": { "warn": "chan-warn", "ban": "chan-ban" }
            }"#,
        )
        .unwrap();

        let config = RosterConfig::from_file(&path).unwrap();
        assert_eq!(config.member_role_id, "ROLE-1");
        assert_eq!(
            config.log_channels.destination(OperationKind::Warn),
            Some("chan-warn")
        );
        assert_eq!(config.log_channels.destination(OperationKind::Add), None);
        assert_eq!(config.event_buffer, 256);
    }

    #[test]
    fn test_invalid_file_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        std::fs::write(&path, "not json").unwrap();

        let err = RosterConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_database_url_override() {
        let config = RosterConfig::default().with_database_url(Some("sqlite::memory:".into()));
        assert_eq!(config.database_url, "sqlite::memory:");

        let config = RosterConfig::default().with_database_url(Some("  ".into()));
        assert_eq!(config.database_url, "sqlite:roster.db?mode=rwc");
    }
}
