//! Git operations module.
//!
//! Everything here shells out to `git` through a [`CommandRunner`] and works
//! only with its text output.

mod diff;

pub use diff::{parse_name_status, truncate_diff, ChangedFile, TruncatedDiff};

use crate::error::{Error, Result};
use crate::traits::{CommandOutput, CommandRunner};
use serde::Serialize;

/// Branch compared against when the caller does not name one.
pub const DEFAULT_BASE_BRANCH: &str = "main";

/// Diff line budget when the caller does not give one.
pub const DEFAULT_MAX_DIFF_LINES: usize = 500;

/// Placeholder reported in place of the diff when it was not requested.
const DIFF_NOT_INCLUDED: &str = "Diff not included (set include_diff=true to see full diff)";

/// Run git and fail if it exits non-zero.
///
/// # Errors
///
/// Returns [`Error::CommandFailed`] with git's stderr on a non-zero exit, or
/// an I/O error if git cannot be started.
pub fn run_git(runner: &dyn CommandRunner, args: &[&str]) -> Result<CommandOutput> {
    let output = runner.run("git", args)?;
    if output.success() {
        Ok(output)
    } else {
        Err(Error::CommandFailed {
            command: format!("git {}", args.join(" ")),
            exit_code: output.exit_code,
            stderr: output.stderr.trim_end().to_string(),
        })
    }
}

/// Check if we're in a git repository.
pub fn is_git_repo(runner: &dyn CommandRunner) -> bool {
    runner.run("git", &["rev-parse", "--git-dir"]).map(|o| o.success()).unwrap_or(false)
}

/// Options for [`analyze_file_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Branch the current HEAD is compared against.
    pub base_branch: String,
    /// Whether to include the full diff text.
    pub include_diff: bool,
    /// Maximum number of diff lines to include.
    pub max_diff_lines: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            base_branch: DEFAULT_BASE_BRANCH.to_string(),
            include_diff: true,
            max_diff_lines: DEFAULT_MAX_DIFF_LINES,
        }
    }
}

/// Summary of the changes between a base branch and HEAD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChangesAnalysis {
    /// The branch compared against.
    pub base_branch: String,
    /// Raw `git diff --name-status` output.
    pub files_changed: String,
    /// The same list, parsed.
    pub changed_files: Vec<ChangedFile>,
    /// Raw `git diff --stat` output.
    pub statistics: String,
    /// Raw `git log --oneline` output for commits not on the base branch.
    pub commits: String,
    /// The (possibly truncated) diff, or a placeholder when not requested.
    pub diff: String,
    /// Whether the diff was truncated.
    pub truncated: bool,
    /// Line count of the full diff, or 0 when not requested.
    pub total_diff_lines: usize,
}

/// Collect changed files, diff statistics, commits and the diff itself.
///
/// Only the file listing must succeed: if git cannot compare the branches
/// at all the whole analysis fails. The later commands reuse whatever they
/// print, matching how they are reported to the agent.
///
/// # Errors
///
/// Returns [`Error::CommandFailed`] if `git diff --name-status` fails, or an
/// I/O error if git cannot be started.
pub fn analyze_file_changes(
    runner: &dyn CommandRunner,
    options: &AnalyzeOptions,
) -> Result<FileChangesAnalysis> {
    let range = format!("{}...HEAD", options.base_branch);
    let log_range = format!("{}..HEAD", options.base_branch);

    let files_changed = run_git(runner, &["diff", "--name-status", &range])?.stdout;
    let statistics = runner.run("git", &["diff", "--stat", &range])?.stdout;

    let (diff, truncated, total_diff_lines) = if options.include_diff {
        let full = runner.run("git", &["diff", &range])?.stdout;
        let shaped = truncate_diff(&full, options.max_diff_lines);
        (shaped.content, shaped.truncated, shaped.total_lines)
    } else {
        (DIFF_NOT_INCLUDED.to_string(), false, 0)
    };

    let commits = runner.run("git", &["log", "--oneline", &log_range])?.stdout;

    tracing::debug!(
        base = %options.base_branch,
        truncated,
        total_diff_lines,
        "analyzed file changes"
    );

    Ok(FileChangesAnalysis {
        base_branch: options.base_branch.clone(),
        changed_files: parse_name_status(&files_changed),
        files_changed,
        statistics,
        commits,
        diff,
        truncated,
        total_diff_lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCommandRunner;

    #[test]
    fn test_is_git_repo_true() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["rev-parse", "--git-dir"], CommandOutput::ok(".git\n"));
        assert!(is_git_repo(&runner));
    }

    #[test]
    fn test_is_git_repo_false() {
        let mut runner = MockCommandRunner::new();
        runner.expect(
            "git",
            &["rev-parse", "--git-dir"],
            CommandOutput {
                exit_code: 128,
                stdout: String::new(),
                stderr: "fatal: not a git repository\n".to_string(),
            },
        );
        assert!(!is_git_repo(&runner));
    }

    #[test]
    fn test_run_git_failure_carries_stderr() {
        let mut runner = MockCommandRunner::new();
        runner.expect(
            "git",
            &["diff", "--name-status", "nope...HEAD"],
            CommandOutput {
                exit_code: 128,
                stdout: String::new(),
                stderr: "fatal: ambiguous argument 'nope...HEAD'\n".to_string(),
            },
        );

        let err = run_git(&runner, &["diff", "--name-status", "nope...HEAD"]).unwrap_err();
        match err {
            Error::CommandFailed { command, exit_code, stderr } => {
                assert_eq!(command, "git diff --name-status nope...HEAD");
                assert_eq!(exit_code, 128);
                assert_eq!(stderr, "fatal: ambiguous argument 'nope...HEAD'");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_analyze_file_changes_full() {
        let mut runner = MockCommandRunner::new();
        runner.expect(
            "git",
            &["diff", "--name-status", "main...HEAD"],
            CommandOutput::ok("M\tsrc/lib.rs\n"),
        );
        runner.expect(
            "git",
            &["diff", "--stat", "main...HEAD"],
            CommandOutput::ok(" src/lib.rs | 2 +-\n"),
        );
        runner.expect("git", &["diff", "main...HEAD"], CommandOutput::ok("-old\n+new\n"));
        runner.expect(
            "git",
            &["log", "--oneline", "main..HEAD"],
            CommandOutput::ok("abc123 Fix thing\n"),
        );

        let analysis = analyze_file_changes(&runner, &AnalyzeOptions::default()).unwrap();
        runner.verify();

        assert_eq!(analysis.base_branch, "main");
        assert_eq!(analysis.files_changed, "M\tsrc/lib.rs\n");
        assert_eq!(analysis.changed_files.len(), 1);
        assert_eq!(analysis.changed_files[0].path, "src/lib.rs");
        assert_eq!(analysis.statistics, " src/lib.rs | 2 +-\n");
        assert_eq!(analysis.commits, "abc123 Fix thing\n");
        assert_eq!(analysis.diff, "-old\n+new\n");
        assert!(!analysis.truncated);
        assert_eq!(analysis.total_diff_lines, 3);
    }

    #[test]
    fn test_analyze_file_changes_without_diff() {
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["diff", "--name-status", "develop...HEAD"], CommandOutput::ok(""));
        runner.expect("git", &["diff", "--stat", "develop...HEAD"], CommandOutput::ok(""));
        runner.expect("git", &["log", "--oneline", "develop..HEAD"], CommandOutput::ok(""));

        let options = AnalyzeOptions {
            base_branch: "develop".to_string(),
            include_diff: false,
            ..AnalyzeOptions::default()
        };
        let analysis = analyze_file_changes(&runner, &options).unwrap();
        runner.verify();

        assert_eq!(analysis.diff, DIFF_NOT_INCLUDED);
        assert_eq!(analysis.total_diff_lines, 0);
        assert!(!analysis.truncated);
    }

    #[test]
    fn test_analyze_file_changes_truncates() {
        let long_diff = (0..20).map(|n| format!("+line {n}")).collect::<Vec<_>>().join("\n");
        let mut runner = MockCommandRunner::new();
        runner.expect("git", &["diff", "--name-status", "main...HEAD"], CommandOutput::ok(""));
        runner.expect("git", &["diff", "--stat", "main...HEAD"], CommandOutput::ok(""));
        runner.expect("git", &["diff", "main...HEAD"], CommandOutput::ok(&long_diff));
        runner.expect("git", &["log", "--oneline", "main..HEAD"], CommandOutput::ok(""));

        let options = AnalyzeOptions { max_diff_lines: 5, ..AnalyzeOptions::default() };
        let analysis = analyze_file_changes(&runner, &options).unwrap();

        assert!(analysis.truncated);
        assert_eq!(analysis.total_diff_lines, 20);
        assert!(analysis.diff.contains("Showing 5 of 20 lines"));
    }

    #[test]
    fn test_analyze_file_changes_bad_base_branch() {
        let mut runner = MockCommandRunner::new();
        runner.expect(
            "git",
            &["diff", "--name-status", "missing...HEAD"],
            CommandOutput {
                exit_code: 128,
                stdout: String::new(),
                stderr: "fatal: bad revision\n".to_string(),
            },
        );

        let options =
            AnalyzeOptions { base_branch: "missing".to_string(), ..AnalyzeOptions::default() };
        let result = analyze_file_changes(&runner, &options);
        assert!(matches!(result, Err(Error::CommandFailed { .. })));
        runner.verify();
    }
}
