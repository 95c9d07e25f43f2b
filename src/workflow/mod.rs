// zerodbtool/src/workflow/mod.rs
//! Operator workflows. Each one opens its own connection, runs its steps
//! strictly in order and releases the connection on success and on failure.
//!
//! Restore workflows do not compensate: once the RESTORE has been issued a
//! later failure (login re-map, upgrade script) leaves the database restored
//! but not fully repaired, and the error says which step failed.
use std::path::PathBuf;

use crate::backup::{self, ScriptReport};
use crate::config::AppConfig;
use crate::db::{Connector, SqlSession};
use crate::errors::Result;
use crate::repository::{self, BaselineEntry, LATEST_TOKEN};
use crate::sql::REPORTS_USER;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    NotRequested,
    NotConfigured,
    Ran(ScriptReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub baseline: BaselineEntry,
    pub safety_backup: Option<PathBuf>,
    pub upgrade: UpgradeOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored(RestoreReport),
    /// The requested version is not in the Zero DB repository; nothing was touched.
    VersionNotFound(String),
}

impl RestoreOutcome {
    pub fn summary(&self, database_name: &str) -> String {
        match self {
            RestoreOutcome::VersionNotFound(version) => format!(
                "Could not find the Version:{} in Zero Repo, please verify the input.",
                version
            ),
            RestoreOutcome::Restored(report) => {
                let mut lines = Vec::new();
                if let Some(path) = &report.safety_backup {
                    lines.push(format!("Safety backup written to {}", path.display()));
                }
                lines.push(format!(
                    "Restored {} to version {} from {}",
                    database_name,
                    report.baseline.version,
                    report.baseline.path.display()
                ));
                match &report.upgrade {
                    UpgradeOutcome::NotRequested => {}
                    UpgradeOutcome::NotConfigured => lines.push("No upgrade script configured".to_string()),
                    UpgradeOutcome::Ran(script) if script.is_clean() => lines.push(format!(
                        "Upgrade script ran {} batches",
                        script.executed
                    )),
                    UpgradeOutcome::Ran(script) => {
                        lines.push(format!(
                            "⚠️ Upgrade script ran {} batches, {} failed:",
                            script.executed,
                            script.failures.len()
                        ));
                        for failure in &script.failures {
                            lines.push(format!("   batch {}: {}", failure.batch, failure.message));
                        }
                    }
                }
                lines.join("\n")
            }
        }
    }
}

pub struct Workflow<'a, C: Connector> {
    config: &'a AppConfig,
    connector: &'a C,
}

impl<'a, C: Connector> Workflow<'a, C> {
    pub fn new(config: &'a AppConfig, connector: &'a C) -> Self {
        Self { config, connector }
    }

    async fn open(&self) -> Result<C::Session> {
        self.connector.connect(&self.config.connection_string).await
    }

    async fn release(session: C::Session) {
        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "Failed to close database connection cleanly");
        }
    }

    pub async fn test_connection(&self) -> Result<()> {
        let mut session = self.open().await?;
        let result = backup::check_connection(&mut session).await;
        Self::release(session).await;
        result
    }

    /// Backs the database up into the single quick-save slot, overwriting it.
    pub async fn quick_save(&self) -> Result<PathBuf> {
        let slot = &self.config.quick_save_path;
        let mut session = self.open().await?;
        let result = backup::backup_to_file(&mut session, &self.config.database_name, slot).await;
        Self::release(session).await;
        result.map(|_| slot.clone())
    }

    pub async fn quick_restore(&self) -> Result<()> {
        let mut session = self.open().await?;
        let result =
            backup::restore(&mut session, &self.config.database_name, &self.config.quick_save_path).await;
        Self::release(session).await;
        result
    }

    pub fn list_baselines(&self) -> Result<Vec<BaselineEntry>> {
        repository::list_baselines(&self.config.zero_db_backup_directory)
    }

    /// Restores the given baseline version and re-maps the reports user.
    pub async fn restore_to_version(&self, version_token: &str) -> Result<RestoreOutcome> {
        self.restore(version_token, false).await
    }

    /// Restores the newest baseline, re-maps the reports user and runs the upgrade script.
    pub async fn restore_latest_and_upgrade(&self) -> Result<RestoreOutcome> {
        self.restore(LATEST_TOKEN, true).await
    }

    /// Resolve, connect, optional safety backup, restore, re-map, optional upgrade.
    pub async fn restore(&self, version_token: &str, run_upgrade: bool) -> Result<RestoreOutcome> {
        let Some(baseline) =
            repository::resolve_baseline(&self.config.zero_db_backup_directory, version_token)?
        else {
            tracing::warn!(version = version_token, "Version not found in Zero DB repository");
            return Ok(RestoreOutcome::VersionNotFound(version_token.to_string()));
        };
        tracing::info!(version = %baseline.version, path = %baseline.path.display(), "Resolved baseline");

        let mut session = self.open().await?;
        let result = self.restore_steps(&mut session, baseline, run_upgrade).await;
        Self::release(session).await;
        result.map(RestoreOutcome::Restored)
    }

    async fn restore_steps(
        &self,
        session: &mut C::Session,
        baseline: BaselineEntry,
        run_upgrade: bool,
    ) -> Result<RestoreReport> {
        let database_name = &self.config.database_name;

        let safety_backup = if self.config.create_backup_before_upgrade {
            Some(backup::backup_to_folder(session, database_name, &self.config.new_backup_directory).await?)
        } else {
            tracing::info!("CREATE_BACKUP_BEFORE_UPGRADE is off, skipping safety backup");
            None
        };

        backup::restore(session, database_name, &baseline.path).await?;
        backup::remap_login(session, database_name, REPORTS_USER).await?;

        let upgrade = if !run_upgrade {
            UpgradeOutcome::NotRequested
        } else if let Some(script_path) = &self.config.upgrade_script_path {
            let report =
                backup::execute_script(session, script_path, self.config.script_failure_policy).await?;
            if !report.is_clean() {
                tracing::warn!(failed = report.failures.len(), "Upgrade script finished with failed batches");
            }
            UpgradeOutcome::Ran(report)
        } else {
            tracing::info!("No upgrade script configured");
            UpgradeOutcome::NotConfigured
        };

        Ok(RestoreReport {
            baseline,
            safety_backup,
            upgrade,
        })
    }
}
