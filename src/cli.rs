use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

/// Restore a database from the Zero DB repository.
///
/// Run without arguments to enter the interactive menu.
#[derive(Debug, Parser)]
#[command(name = "zerodbtool")]
pub struct Cli {
    /// Database version in the Zero DB repository, or "latest" (required in command mode)
    #[arg(short = 'v', long = "db-version", value_name = "DB_VERSION")]
    pub db_version: Option<String>,

    /// Path of the JSON config file
    #[arg(short, long, value_name = "CONFIG_FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Run the upgrade script from the config file after the restore
    #[arg(short, long)]
    pub upgrade: bool,
}

impl Cli {
    /// `-v` is optional for clap so that no arguments at all can mean interactive mode,
    /// but command mode cannot run without it.
    pub fn required_db_version(&self) -> Result<&str, clap::Error> {
        self.db_version.as_deref().ok_or_else(|| {
            Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                "-v <DB_VERSION> must be specified as the database version to be restored",
            )
        })
    }
}

pub fn help_text() -> String {
    Cli::command().render_help().to_string()
}
