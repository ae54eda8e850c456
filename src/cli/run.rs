//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::cli::Command;
use crate::command::RealCommandRunner;
use crate::config::{ProjectConfig, Settings};
use crate::error::{Error, Result};
use crate::events::{self, EventStore};
use crate::git::{self, AnalyzeOptions};
use crate::paths;
use crate::pr_templates;
use serde::Serialize;
use std::process::ExitCode;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Run a CLI command against resolved project settings.
pub fn run(command: Command, settings: &Settings) -> CliOutput {
    match command {
        Command::RecentEvents { limit } => {
            result_output(events::recent_events(&event_store(settings), limit))
        }
        Command::WorkflowStatus { workflow } => {
            result_output(events::workflow_status(&event_store(settings), workflow.as_deref()))
        }
        Command::AnalyzeChanges { base_branch, no_diff, max_diff_lines } => {
            let options = AnalyzeOptions { base_branch, include_diff: !no_diff, max_diff_lines };
            result_output(analyze_changes(settings, &options))
        }
        Command::Templates => result_output(pr_templates::list_templates(&settings.templates_dir)),
        Command::SuggestTemplate { change_type, summary } => result_output(
            pr_templates::suggest_template(&settings.templates_dir, &summary, &change_type),
        ),
        Command::Paths => json_output(&PathsReport::new(settings)),
        Command::Version => run_version(),
    }
}

fn event_store(settings: &Settings) -> EventStore {
    EventStore::new(settings.events_file.clone())
}

fn analyze_changes(
    settings: &Settings,
    options: &AnalyzeOptions,
) -> Result<git::FileChangesAnalysis> {
    let runner = RealCommandRunner::in_dir(&settings.project_dir);
    if !git::is_git_repo(&runner) {
        return Err(Error::Git(format!(
            "{} is not inside a git repository",
            settings.project_dir.display()
        )));
    }
    git::analyze_file_changes(&runner, options)
}

// === Utility Commands ===

fn run_version() -> CliOutput {
    CliOutput {
        exit_code: ExitCode::SUCCESS,
        stdout: vec![],
        stderr: vec![format!("pr-agent v{}", crate::VERSION)],
    }
}

/// Where pr-agent reads and writes for one project.
#[derive(Debug, Serialize)]
struct PathsReport {
    project_dir: String,
    config_file: String,
    events_file: String,
    events_file_exists: bool,
    templates_dir: String,
    log_file: Option<String>,
    webhook_url: String,
}

impl PathsReport {
    fn new(settings: &Settings) -> Self {
        Self {
            project_dir: settings.project_dir.display().to_string(),
            config_file: ProjectConfig::config_path(&settings.project_dir).display().to_string(),
            events_file: settings.events_file.display().to_string(),
            events_file_exists: settings.events_file.exists(),
            templates_dir: settings.templates_dir.display().to_string(),
            log_file: paths::project_log_path(&settings.project_dir)
                .map(|p| p.display().to_string()),
            webhook_url: settings.webhook_url(),
        }
    }
}

// === Output Helpers ===

fn result_output<T: Serialize>(result: Result<T>) -> CliOutput {
    match result {
        Ok(value) => json_output(&value),
        Err(e) => error_output(format!("Error: {e}")),
    }
}

fn json_output<T: Serialize>(value: &T) -> CliOutput {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(e.to_string()),
    }
}

fn error_output(message: String) -> CliOutput {
    tracing::debug!(%message, "command failed");
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}
