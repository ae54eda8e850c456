//! Command-line interface for pr-agent.
//!
//! Every MCP tool is also available as a command, printing the same JSON.
//! Useful for checking what the agent will see without an MCP client.

mod run;


pub use run::{run, CliOutput};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// PR agent CLI - inspect git changes, PR templates and GitHub Actions events.
///
/// For detailed help on any command, use:
///   pr-agent <command> --help
#[derive(Parser, Debug)]
#[command(name = "pr-agent")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project directory (defaults to the current directory).
    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the most recent webhook events, newest first.
    #[command(name = "recent-events")]
    RecentEvents {
        /// Maximum number of events to show (0 for all)
        #[arg(
            long,
            default_value_t = crate::events::DEFAULT_RECENT_LIMIT,
            allow_negative_numbers = true
        )]
        limit: i64,
    },

    /// Show the latest run of each GitHub Actions workflow.
    #[command(name = "workflow-status")]
    WorkflowStatus {
        /// Only report this workflow (exact name)
        #[arg(long)]
        workflow: Option<String>,
    },

    /// Summarize changes between a base branch and HEAD.
    ///
    /// Reports the changed files, diff statistics, commits and the diff
    /// itself, truncated to --max-diff-lines.
    #[command(name = "analyze-changes")]
    AnalyzeChanges {
        /// Branch to compare against
        #[arg(long, default_value = crate::git::DEFAULT_BASE_BRANCH)]
        base_branch: String,

        /// Leave the diff text out
        #[arg(long)]
        no_diff: bool,

        /// Maximum number of diff lines to include
        #[arg(long, default_value_t = crate::git::DEFAULT_MAX_DIFF_LINES)]
        max_diff_lines: usize,
    },

    /// List the PR templates with their content.
    Templates,

    /// Recommend a PR template for a change.
    #[command(name = "suggest-template")]
    SuggestTemplate {
        /// Type of change (bug, feature, docs, refactor, test, performance, security)
        #[arg(long = "type")]
        change_type: String,

        /// Short summary of what the change does
        #[arg(long)]
        summary: String,
    },

    /// Show where pr-agent keeps its files for this project.
    Paths,

    /// Show version information.
    Version,
}
