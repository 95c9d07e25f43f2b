// zerodbtool/src/backup/script.rs
use std::fs;
use std::path::Path;

use crate::config::ScriptFailurePolicy;
use crate::db::SqlSession;
use crate::errors::{AppError, Result};
use crate::sql::{is_blank_batch, split_batches};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// 1-based position of the batch in the script.
    pub batch: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub executed: usize,
    pub skipped: usize,
    pub failures: Vec<BatchFailure>,
}

impl ScriptReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Executes every non-blank `GO` batch of the script at `script_path` in order.
///
/// Nothing is rolled back: batches that already ran stay applied. With
/// `ContinueOnFailure` a failing batch is recorded and the next one is still
/// attempted; with `StopOnFirstFailure` the first failure is returned.
pub async fn execute_script<S: SqlSession>(
    session: &mut S,
    script_path: &Path,
    policy: ScriptFailurePolicy,
) -> Result<ScriptReport> {
    if !script_path.is_file() {
        return Err(AppError::ScriptNotFound(script_path.to_path_buf()));
    }
    let script = fs::read_to_string(script_path)?;
    let batches = split_batches(&script);
    tracing::info!(path = %script_path.display(), batches = batches.len(), "Executing script");

    let mut report = ScriptReport::default();
    for (idx, batch) in batches.iter().enumerate() {
        if is_blank_batch(batch) {
            report.skipped += 1;
            continue;
        }

        match session.execute(batch).await {
            Ok(_) => report.executed += 1,
            Err(e) => match policy {
                ScriptFailurePolicy::StopOnFirstFailure => {
                    return Err(AppError::database(
                        format!("executing batch {} of {}", idx + 1, script_path.display()),
                        e,
                    ));
                }
                ScriptFailurePolicy::ContinueOnFailure => {
                    tracing::warn!(batch = idx + 1, error = %e, "Script batch failed, continuing");
                    report.failures.push(BatchFailure {
                        batch: idx + 1,
                        message: e.to_string(),
                    });
                }
            },
        }
    }

    tracing::info!(
        executed = report.executed,
        skipped = report.skipped,
        failed = report.failures.len(),
        "Script finished"
    );
    Ok(report)
}
