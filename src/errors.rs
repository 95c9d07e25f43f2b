use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing required configuration keys: {}", .0.join(", "))]
    MissingConfigKeys(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Zero DB repository {} does not exist or is not a directory", .0.display())]
    RepositoryNotFound(PathBuf),

    #[error("There are no DB backup files in the Zero DB repository at {}", .0.display())]
    RepositoryEmpty(PathBuf),

    #[error("The backup directory {} does not exist or is not a directory", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("Backup file not found at {} or it is not a regular file", .0.display())]
    BackupFileNotFound(PathBuf),

    #[error("Script file not found at {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("Failed to reach the database server at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Database operation failed while {operation}: {source}")]
    Database {
        operation: String,
        #[source]
        source: tiberius::error::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn database(operation: impl Into<String>, source: tiberius::error::Error) -> Self {
        AppError::Database {
            operation: operation.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
