// zerodbtool/src/menu/mod.rs
//! Interactive mode: a numbered menu dispatched through `MENU`.
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::cli;
use crate::config::AppConfig;
use crate::db::Connector;
use crate::repository::format_baseline_table;
use crate::workflow::Workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    TestConnection,
    ReloadConfig,
    QuickSave,
    QuickRestore,
    ListBaselines,
    RestoreVersion,
    RestoreLatestAndUpgrade,
    Help,
    Exit,
}

/// Key typed by the operator, the command it selects and its label.
pub const MENU: [(&str, MenuCommand, &str); 9] = [
    ("0", MenuCommand::TestConnection, "Test Connection"),
    ("1", MenuCommand::ReloadConfig, "Reload the Config File"),
    ("2", MenuCommand::QuickSave, "Quick Save DB"),
    ("3", MenuCommand::QuickRestore, "Quick Restore DB"),
    ("4", MenuCommand::ListBaselines, "Check Zero DB Repo"),
    ("5", MenuCommand::RestoreVersion, "Get DB of a version (Restore from Zero Repo)"),
    ("6", MenuCommand::RestoreLatestAndUpgrade, "Get Latest DB (Restore from Zero Repo then run upgrade script)"),
    ("7", MenuCommand::Help, "Help for command line mode"),
    ("8", MenuCommand::Exit, "Exit"),
];

impl MenuCommand {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        MENU.iter().find(|(key, _, _)| *key == input).map(|(_, command, _)| *command)
    }
}

pub fn render_menu() -> String {
    let mut out = String::from("------------------DB HELPER----------------------\n");
    for (key, _, label) in MENU {
        out.push_str(&format!("    {}. {}\n", key, label));
    }
    out
}

enum Flow {
    Continue,
    Exit,
}

pub struct InteractiveMenu<C, R, W> {
    config_path: PathBuf,
    config: AppConfig,
    connector: C,
    input: R,
    output: W,
}

impl<C: Connector, R: BufRead, W: Write> InteractiveMenu<C, R, W> {
    pub fn new(config_path: PathBuf, config: AppConfig, connector: C, input: R, output: W) -> Self {
        Self {
            config_path,
            config,
            connector,
            input,
            output,
        }
    }

    /// Runs until the operator picks Exit or input ends. A failed action is
    /// printed and the menu is shown again.
    pub async fn run(mut self) -> Result<()> {
        loop {
            write!(self.output, "{}Please select:", render_menu())?;
            self.output.flush().context("Failed to flush stdout")?;

            let Some(choice) = self.read_line()? else {
                return Ok(());
            };
            let Some(command) = MenuCommand::parse(&choice) else {
                continue;
            };

            match self.dispatch(command).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(e) => {
                    tracing::error!(?command, error = %format!("{:#}", e), "Menu action failed");
                    writeln!(self.output, "❌ Error: {:#}", e)?;
                }
            }
        }
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read user input")?;
        Ok((read > 0).then(|| line.trim().to_string()))
    }

    async fn dispatch(&mut self, command: MenuCommand) -> Result<Flow> {
        match command {
            MenuCommand::TestConnection => {
                Workflow::new(&self.config, &self.connector).test_connection().await?;
                writeln!(self.output, "✅ Connection test successful!")?;
            }
            MenuCommand::ReloadConfig => {
                // The old config stays in effect when the new one does not validate.
                let reloaded = AppConfig::load_from_json(&self.config_path).with_context(|| {
                    format!("Failed to reload configuration from {}", self.config_path.display())
                })?;
                self.config = reloaded;
                write!(self.output, "{}", self.config.describe())?;
            }
            MenuCommand::QuickSave => {
                let slot = Workflow::new(&self.config, &self.connector).quick_save().await?;
                writeln!(self.output, "✅ Saved {} to {}", self.config.database_name, slot.display())?;
            }
            MenuCommand::QuickRestore => {
                Workflow::new(&self.config, &self.connector).quick_restore().await?;
                writeln!(
                    self.output,
                    "✅ Restored {} from {}",
                    self.config.database_name,
                    self.config.quick_save_path.display()
                )?;
            }
            MenuCommand::ListBaselines => {
                let baselines = Workflow::new(&self.config, &self.connector).list_baselines()?;
                if baselines.is_empty() {
                    writeln!(self.output, "No DB backups found in the Zero DB repository.")?;
                } else {
                    write!(self.output, "{}", format_baseline_table(&baselines))?;
                }
            }
            MenuCommand::RestoreVersion => {
                write!(self.output, "Please enter the version you would like to restore:")?;
                self.output.flush()?;
                let Some(version) = self.read_line()? else {
                    return Ok(Flow::Exit);
                };
                let outcome = Workflow::new(&self.config, &self.connector)
                    .restore_to_version(&version)
                    .await?;
                writeln!(self.output, "{}", outcome.summary(&self.config.database_name))?;
            }
            MenuCommand::RestoreLatestAndUpgrade => {
                let outcome = Workflow::new(&self.config, &self.connector)
                    .restore_latest_and_upgrade()
                    .await?;
                writeln!(self.output, "{}", outcome.summary(&self.config.database_name))?;
            }
            MenuCommand::Help => writeln!(self.output, "{}", cli::help_text())?,
            MenuCommand::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingConnector;
    use serde_json::json;
    use std::fs::{self, File};
    use std::io::Cursor;

    struct Setup {
        _root: tempfile::TempDir,
        config_path: PathBuf,
        config: AppConfig,
    }

    fn setup(baselines: &[&str]) -> Setup {
        let root = tempfile::tempdir().expect("tempdir");
        let zero = root.path().join("zero");
        fs::create_dir(&zero).expect("zero dir");
        for name in baselines {
            File::create(zero.join(name)).expect("baseline");
        }
        let config_path = root.path().join("config.json");
        let value = json!({
            "DATABASE_NAME": "Inventory",
            "ZERO_DB_BACKUP_DIRECTORY": zero,
            "NEW_BACKUP_DIRECTORY": root.path(),
            "CONNECTION_STRING": "server=tcp:localhost,1433"
        });
        fs::write(&config_path, value.to_string()).expect("config file");
        let config = AppConfig::load_from_json(&config_path).expect("config");
        Setup {
            _root: root,
            config_path,
            config,
        }
    }

    async fn run_menu(setup: &Setup, connector: RecordingConnector, input: &str) -> String {
        let mut output = Vec::new();
        InteractiveMenu::new(
            setup.config_path.clone(),
            setup.config.clone(),
            connector,
            Cursor::new(input.as_bytes().to_vec()),
            &mut output,
        )
        .run()
        .await
        .expect("menu run");
        String::from_utf8(output).expect("utf8")
    }

    #[test]
    fn parses_every_menu_key_and_rejects_others() {
        assert_eq!(MenuCommand::parse("0"), Some(MenuCommand::TestConnection));
        assert_eq!(MenuCommand::parse(" 6 "), Some(MenuCommand::RestoreLatestAndUpgrade));
        assert_eq!(MenuCommand::parse("8"), Some(MenuCommand::Exit));
        assert_eq!(MenuCommand::parse("9"), None);
        assert_eq!(MenuCommand::parse("12"), None);
        assert_eq!(MenuCommand::parse(""), None);
    }

    #[test]
    fn rendered_menu_lists_all_entries() {
        let menu = render_menu();
        for (key, _, label) in MENU {
            assert!(menu.contains(&format!("{}. {}", key, label)));
        }
    }

    #[tokio::test]
    async fn lists_baselines_then_exits() {
        let setup = setup(&["1.0.bak", "2.0.bak"]);
        let output = run_menu(&setup, RecordingConnector::default(), "4\n8\n").await;

        assert!(output.contains("AVAILABLE DB BACKUPS"));
        let newest = output.find("2.0.bak").expect("2.0 listed");
        let oldest = output.find("1.0.bak").expect("1.0 listed");
        assert!(newest < oldest);
    }

    #[tokio::test]
    async fn invalid_choice_shows_menu_again_and_eof_exits() {
        let setup = setup(&[]);
        let output = run_menu(&setup, RecordingConnector::default(), "x\n").await;
        assert_eq!(output.matches("DB HELPER").count(), 2);
    }

    #[tokio::test]
    async fn restore_version_prompts_and_reports_missing_version() {
        let setup = setup(&["2.0.bak"]);
        let connector = RecordingConnector::default();
        let output = run_menu(&setup, connector.clone(), "5\n3.0\n8\n").await;

        assert!(output.contains("Could not find the Version:3.0"));
        assert_eq!(connector.recorder.opened(), 0);
    }

    #[tokio::test]
    async fn failing_action_is_reported_and_loop_continues() {
        let setup = setup(&[]);
        let connector = RecordingConnector::default();
        connector.recorder.fail_when_contains("GETDATE");
        let output = run_menu(&setup, connector.clone(), "0\n6\n8\n").await;

        assert!(output.contains("❌ Error"));
        assert!(output.contains("no DB backup files"));
        assert_eq!(connector.recorder.opened(), connector.recorder.closed());
    }

    #[tokio::test]
    async fn reload_keeps_previous_config_when_file_becomes_invalid() {
        let setup = setup(&[]);
        fs::write(&setup.config_path, "{}").expect("overwrite config");
        let connector = RecordingConnector::default();
        let output = run_menu(&setup, connector.clone(), "1\n0\n8\n").await;

        assert!(output.contains("Missing required configuration keys"));
        assert!(output.contains("Connection test successful"));
        assert_eq!(connector.recorder.statements(), vec!["SELECT GETDATE()".to_string()]);
    }
}
