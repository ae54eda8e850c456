//! Core traits for testability and abstraction.

use crate::error::Result;

/// Output from a command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// The exit code of the command.
    pub exit_code: i32,
    /// The stdout output.
    pub stdout: String,
    /// The stderr output.
    pub stderr: String,
}

impl CommandOutput {
    /// Check if the command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Build a successful output with the given stdout.
    #[must_use]
    pub fn ok(stdout: &str) -> Self {
        Self { exit_code: 0, stdout: stdout.to_string(), stderr: String::new() }
    }
}

/// Trait for running external programs.
///
/// The git tools only ever see a program's text output through this seam,
/// which lets tests substitute canned output for a real repository.
pub trait CommandRunner {
    /// Run `program` with `args` to completion and capture its output.
    ///
    /// A non-zero exit status is not an error here; callers decide whether
    /// the exit code matters.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or executed.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}
