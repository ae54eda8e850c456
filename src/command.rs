//! Real command execution implementation.

use crate::error::Result;
use crate::traits::{CommandOutput, CommandRunner};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Command runner that spawns real processes.
///
/// Commands run in the configured working directory, or in the process's
/// current directory when none is set. There is no timeout: a hung child
/// blocks the caller.
#[derive(Debug, Default, Clone)]
pub struct RealCommandRunner {
    working_dir: Option<PathBuf>,
}

impl RealCommandRunner {
    /// Create a runner that uses the current directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { working_dir: None }
    }

    /// Create a runner that executes every command inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self { working_dir: Some(dir.to_path_buf()) }
    }
}

impl CommandRunner for RealCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        tracing::debug!(program, ?args, "running command");
        let output = command.output()?;

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        Ok(CommandOutput { exit_code, stdout, stderr })
    }
}
