use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable that pins the database location.
pub const DB_PATH_ENV: &str = "PENSION_DESK_DB_PATH";

/// File name used when the database lives in a directory we pick.
pub const DEFAULT_DB_FILE: &str = "pension_desk.db";

// ── Fraud thresholds ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FraudThresholds {
    /// Relative deviation from the expected amount above which the
    /// deposit is rejected.
    pub reject_deviation: f64,
    /// Relative deviation above which a medium, informational indicator
    /// is recorded.
    pub warn_deviation: f64,
    /// Deposits strictly below this amount are rejected.
    pub min_amount: f64,
    pub velocity_window_hours: i64,
    /// More transactions than this inside the velocity window rejects.
    pub max_recent_transactions: i64,
    pub history_window_days: i64,
    /// This many recent high-severity indicators on file forces a reject.
    pub history_reject_count: usize,
    /// How many recent high-severity indicators are inspected.
    pub history_lookback_limit: usize,
}

impl Default for FraudThresholds {
    fn default() -> Self {
        Self {
            reject_deviation: 0.5,
            warn_deviation: 0.2,
            min_amount: 100.0,
            velocity_window_hours: 24,
            max_recent_transactions: 3,
            history_window_days: 7,
            history_reject_count: 2,
            history_lookback_limit: 3,
        }
    }
}

// ── Desk config ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DeskConfigFile {
    db_path: Option<String>,
    fraud: FraudThresholds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeskConfig {
    pub db_path: String,
    pub fraud: FraudThresholds,
}

impl DeskConfig {
    /// Resolve the database location from the environment, default
    /// thresholds.
    pub fn from_env() -> Self {
        Self {
            db_path: resolve_db_path(),
            fraud: FraudThresholds::default(),
        }
    }

    pub fn with_db_path(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            fraud: FraudThresholds::default(),
        }
    }

    /// Load from a JSON config file. Missing keys fall back to defaults;
    /// a missing `db_path` falls back to environment resolution.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: DeskConfigFile = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {path}: {e}"))?;
        Ok(Self {
            db_path: file.db_path.unwrap_or_else(resolve_db_path),
            fraud: file.fraud,
        })
    }
}

/// Where the database lives, in order of preference:
///   1. `PENSION_DESK_DB_PATH`
///   2. `pension_desk.db` in the current directory, if writable
///   3. `pension_desk.db` in the system temp directory (ephemeral)
pub fn resolve_db_path() -> String {
    if let Ok(path) = env::var(DB_PATH_ENV) {
        if !path.trim().is_empty() {
            return path;
        }
    }

    if let Ok(cwd) = env::current_dir() {
        if dir_is_writable(&cwd) {
            return cwd.join(DEFAULT_DB_FILE).to_string_lossy().into_owned();
        }
    }

    log::warn!("Current directory is not writable; database will live in the temp directory");
    env::temp_dir()
        .join(DEFAULT_DB_FILE)
        .to_string_lossy()
        .into_owned()
}

fn dir_is_writable(dir: &Path) -> bool {
    let probe = dir.join(".pension_desk_write_probe");
    match fs::write(&probe, b"probe") {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_file_keeps_remaining_defaults() {
        let path = env::temp_dir().join(format!("desk-config-{}.json", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            r#"{ "db_path": "/var/lib/desk/finance.db", "fraud": { "min_amount": 250.0 } }"#,
        )
        .unwrap();

        let config = DeskConfig::load(path.to_str().unwrap()).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.db_path, "/var/lib/desk/finance.db");
        assert_eq!(config.fraud.min_amount, 250.0);
        assert_eq!(config.fraud.reject_deviation, 0.5);
        assert_eq!(config.fraud.max_recent_transactions, 3);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = DeskConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }
}
