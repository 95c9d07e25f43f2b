// zerodbtool/src/backup/mod.rs
//! Backup, restore and script execution against an open session.
//!
//! Every path check happens before any SQL is sent, so a bad path never
//! leaves a half-run operation behind.
pub(crate) mod script;

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::db::SqlSession;
use crate::errors::{AppError, Result};
use crate::repository::BACKUP_EXTENSION;
use crate::sql;

pub use script::{ScriptReport, execute_script};

/// Full backup of `database_name` to `destination`, overwriting whatever is there.
pub async fn backup_to_file<S: SqlSession>(
    session: &mut S,
    database_name: &str,
    destination: &Path,
) -> Result<()> {
    tracing::info!(database = database_name, path = %destination.display(), "Backing up database");
    session
        .execute(&sql::backup_sql(database_name, destination))
        .await
        .map_err(|e| {
            AppError::database(
                format!("backing up {} to {}", database_name, destination.display()),
                e,
            )
        })?;
    Ok(())
}

/// Backs up into `directory` under a local-time stamped name and returns the full path.
pub async fn backup_to_folder<S: SqlSession>(
    session: &mut S,
    database_name: &str,
    directory: &Path,
) -> Result<PathBuf> {
    if !directory.is_dir() {
        return Err(AppError::InvalidDirectory(directory.to_path_buf()));
    }
    let destination = directory.join(timestamped_backup_name(database_name, Local::now()));
    backup_to_file(session, database_name, &destination).await?;
    Ok(destination)
}

/// Restores `database_name` from `source`, replacing the current database.
pub async fn restore<S: SqlSession>(session: &mut S, database_name: &str, source: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(AppError::BackupFileNotFound(source.to_path_buf()));
    }
    tracing::info!(database = database_name, path = %source.display(), "Restoring database");
    session
        .execute(&sql::restore_sql(database_name, source))
        .await
        .map_err(|e| {
            AppError::database(
                format!("restoring {} from {}", database_name, source.display()),
                e,
            )
        })?;
    Ok(())
}

/// Recreates `user_name` inside `database_name` bound to the server login of the same name.
pub async fn remap_login<S: SqlSession>(session: &mut S, database_name: &str, user_name: &str) -> Result<()> {
    tracing::info!(database = database_name, user = user_name, "Re-mapping database user to server login");
    session
        .execute(&sql::login_remap_sql(database_name, user_name))
        .await
        .map_err(|e| AppError::database(format!("re-mapping user {} in {}", user_name, database_name), e))?;
    Ok(())
}

pub async fn check_connection<S: SqlSession>(session: &mut S) -> Result<()> {
    session
        .execute(sql::CONNECTION_TEST_SQL)
        .await
        .map_err(|e| AppError::database("testing the connection", e))?;
    Ok(())
}

/// `<db>M<month>-D<day>-<HHmmss>.bak`
pub fn timestamped_backup_name(database_name: &str, at: DateTime<Local>) -> String {
    format!(
        "{}{}{}",
        database_name,
        at.format("M%-m-D%-d-%H%M%S"),
        BACKUP_EXTENSION
    )
}
