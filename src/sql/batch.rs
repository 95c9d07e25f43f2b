use regex::Regex;
use std::sync::LazyLock;

/// `GO` alone on its line, in any case, optionally glued to the previous
/// statement's `;` or followed by one.
static BATCH_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)(?:^|;)[ \t]*GO[ \t]*;?[ \t]*\r?(?:\n|\z)")
        .expect("batch separator pattern is valid")
});

/// Split a SQL Server script into batches separated by `GO`.
///
/// `GO` is not T-SQL; SSMS and sqlcmd interpret it on the client. A script with
/// N separators yields N+1 batches in source order. Batches may be empty or
/// whitespace-only; callers skip those instead of sending them to the server.
pub fn split_batches(script: &str) -> Vec<String> {
    BATCH_SEPARATOR.split(script).map(str::to_string).collect()
}

/// True when a batch has nothing for the server to execute.
pub fn is_blank_batch(batch: &str) -> bool {
    batch.trim().is_empty()
}
