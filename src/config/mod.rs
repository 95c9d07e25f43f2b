// zerodbtool/src/config/mod.rs
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_QUICK_SAVE_PATH: &str = r"C:\temp\quicksave.bak";

/// Boolean options may be written either as JSON booleans or as strings ("True", "false").
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum JsonFlag {
    Bool(bool),
    Text(String),
}

impl JsonFlag {
    pub fn is_true(&self) -> bool {
        match self {
            JsonFlag::Bool(value) => *value,
            JsonFlag::Text(text) => text.trim().eq_ignore_ascii_case("true"),
        }
    }

    fn render(&self) -> String {
        match self {
            JsonFlag::Bool(value) => value.to_string(),
            JsonFlag::Text(text) => text.clone(),
        }
    }
}

// Mirrors config.json one-to-one; validated into AppConfig.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawJsonConfig {
    pub database_name: Option<String>,
    pub zero_db_backup_directory: Option<PathBuf>,
    pub new_backup_directory: Option<PathBuf>,
    pub connection_string: Option<String>,
    pub create_backup_before_upgrade: Option<JsonFlag>,
    pub upgrade_script_path: Option<PathBuf>,
    pub quick_save_path: Option<PathBuf>,
    pub stop_on_script_error: Option<JsonFlag>,
}

/// How the executor reacts when one batch of a script fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptFailurePolicy {
    #[default]
    ContinueOnFailure,
    StopOnFirstFailure,
}

/// Validated, immutable configuration. A reload builds a fresh instance.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_name: String,
    pub zero_db_backup_directory: PathBuf,
    pub new_backup_directory: PathBuf,
    pub connection_string: String,
    pub create_backup_before_upgrade: bool,
    pub upgrade_script_path: Option<PathBuf>,
    pub quick_save_path: PathBuf,
    pub script_failure_policy: ScriptFailurePolicy,
    raw_json_config: RawJsonConfig,
}

impl AppConfig {
    pub fn load_from_json(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let raw_json_config: RawJsonConfig = serde_json::from_str(&config_content).map_err(|e| {
            AppError::Config(format!(
                "Failed to parse JSON from config file at {}: {}",
                config_path.display(),
                e
            ))
        })?;
        Self::from_raw(raw_json_config)
    }

    /// Validates the raw mapping. Every missing required key is reported, not just the first.
    pub fn from_raw(raw: RawJsonConfig) -> Result<Self> {
        let mut missing = Vec::new();

        let database_name = required_text(&raw.database_name, "DATABASE_NAME", &mut missing);
        let zero_dir = required_path(&raw.zero_db_backup_directory, "ZERO_DB_BACKUP_DIRECTORY", &mut missing);
        let new_dir = required_path(&raw.new_backup_directory, "NEW_BACKUP_DIRECTORY", &mut missing);
        let connection_string = required_text(&raw.connection_string, "CONNECTION_STRING", &mut missing);

        let (Some(database_name), Some(zero_dir), Some(new_dir), Some(connection_string)) =
            (database_name, zero_dir, new_dir, connection_string)
        else {
            return Err(AppError::MissingConfigKeys(missing));
        };

        let script_failure_policy = match &raw.stop_on_script_error {
            Some(flag) if flag.is_true() => ScriptFailurePolicy::StopOnFirstFailure,
            _ => ScriptFailurePolicy::ContinueOnFailure,
        };

        Ok(AppConfig {
            database_name,
            zero_db_backup_directory: zero_dir,
            new_backup_directory: new_dir,
            connection_string,
            create_backup_before_upgrade: raw
                .create_backup_before_upgrade
                .as_ref()
                .is_some_and(JsonFlag::is_true),
            upgrade_script_path: raw
                .upgrade_script_path
                .clone()
                .filter(|p| !p.as_os_str().is_empty()),
            quick_save_path: raw
                .quick_save_path
                .clone()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_QUICK_SAVE_PATH)),
            script_failure_policy,
            raw_json_config: raw,
        })
    }

    /// Renders the config file contents the way they were read, one key per line.
    pub fn describe(&self) -> String {
        let raw = &self.raw_json_config;
        let entries: [(&str, Option<String>); 8] = [
            ("DATABASE_NAME", raw.database_name.clone()),
            ("ZERO_DB_BACKUP_DIRECTORY", raw.zero_db_backup_directory.as_ref().map(|p| p.display().to_string())),
            ("NEW_BACKUP_DIRECTORY", raw.new_backup_directory.as_ref().map(|p| p.display().to_string())),
            ("CONNECTION_STRING", raw.connection_string.clone()),
            ("CREATE_BACKUP_BEFORE_UPGRADE", raw.create_backup_before_upgrade.as_ref().map(JsonFlag::render)),
            ("UPGRADE_SCRIPT_PATH", raw.upgrade_script_path.as_ref().map(|p| p.display().to_string())),
            ("QUICK_SAVE_PATH", raw.quick_save_path.as_ref().map(|p| p.display().to_string())),
            ("STOP_ON_SCRIPT_ERROR", raw.stop_on_script_error.as_ref().map(JsonFlag::render)),
        ];

        let mut out = String::from("----------------CURRENT CONFIG.JSON CONTENTS------------------------\n");
        for (key, value) in entries {
            if let Some(value) = value {
                out.push_str(&format!("  {:<30}:{}\n", key, value));
            }
        }
        out.push_str("-----------------END OF CONFIG.JSON CONTENTS------------------------\n");
        out
    }
}

fn required_text(value: &Option<String>, key: &str, missing: &mut Vec<String>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Some(text.to_string()),
        _ => {
            missing.push(key.to_string());
            None
        }
    }
}

fn required_path(value: &Option<PathBuf>, key: &str, missing: &mut Vec<String>) -> Option<PathBuf> {
    match value {
        Some(path) if !path.as_os_str().is_empty() => Some(path.clone()),
        _ => {
            missing.push(key.to_string());
            None
        }
    }
}
