// zerodbtool/src/repository/mod.rs
//! Zero DB repository: a flat directory of `<version>.bak` baseline backups.
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, Result};

pub const BACKUP_EXTENSION: &str = ".bak";
pub const LATEST_TOKEN: &str = "latest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineEntry {
    pub version: String,
    pub path: PathBuf,
}

/// Lists every baseline in `zero_dir`, newest first.
///
/// Versions come from file names with the extension stripped and are ordered
/// descending by plain string comparison, so `v10` sorts below `v2`. The first
/// entry is what "latest" resolves to.
pub fn list_baselines(zero_dir: &Path) -> Result<Vec<BaselineEntry>> {
    if !zero_dir.is_dir() {
        return Err(AppError::RepositoryNotFound(zero_dir.to_path_buf()));
    }

    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(zero_dir)? {
        let dir_entry = dir_entry?;
        // Follows symlinks, so a linked baseline lists the same way restore accepts it.
        if !dir_entry.path().is_file() {
            continue;
        }
        let file_name = dir_entry.file_name();
        let Some(name) = file_name.to_str() else {
            tracing::warn!(file = ?file_name, "Skipping non UTF-8 file name in Zero DB repository");
            continue;
        };
        if let Some(version) = name.strip_suffix(BACKUP_EXTENSION) {
            if version.is_empty() {
                continue;
            }
            entries.push(BaselineEntry {
                version: version.to_string(),
                path: dir_entry.path(),
            });
        }
    }

    entries.sort_by(|a, b| b.version.cmp(&a.version));
    Ok(entries)
}

/// Resolves `"latest"` (any case) or an exact version string to a baseline.
///
/// An unknown explicit version is `Ok(None)` so the caller can tell the
/// operator; an empty repository asked for "latest" is `RepositoryEmpty`.
pub fn resolve_baseline(zero_dir: &Path, version_token: &str) -> Result<Option<BaselineEntry>> {
    let baselines = list_baselines(zero_dir)?;

    if version_token.trim().eq_ignore_ascii_case(LATEST_TOKEN) {
        return baselines
            .into_iter()
            .next()
            .map(Some)
            .ok_or_else(|| AppError::RepositoryEmpty(zero_dir.to_path_buf()));
    }

    Ok(baselines.into_iter().find(|entry| entry.version == version_token))
}

/// Fixed-width "Version / Path" table for the operator.
pub fn format_baseline_table(baselines: &[BaselineEntry]) -> String {
    let mut out = String::from("-----------------AVAILABLE DB BACKUPS--------------------------------\n");
    out.push_str(&format!("{:^10} {:<30}\n", "Version", "Path"));
    for entry in baselines {
        out.push_str(&format!("{:<10} {:<30}\n", entry.version, entry.path.display()));
    }
    out
}
