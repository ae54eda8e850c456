//! Log subscriber setup and tool call logging.
//!
//! The MCP server speaks its protocol over stdout, so it logs to a file in
//! the project data directory instead. The webhook server and the CLI log
//! to stderr. Both read their filter from `PR_AGENT_LOG`.

use crate::error::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::panic;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "PR_AGENT_LOG";

/// Filter used when `PR_AGENT_LOG` is unset or invalid.
pub const DEFAULT_LEVEL: &str = "info";

/// Maximum log file size before rotation (1MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Open the log file for appending, rotating it to `<name>.log.old` first
/// if it has grown past the size limit.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created.
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Ok(metadata) = fs::metadata(path) {
        if metadata.len() > MAX_LOG_SIZE {
            let _ = fs::rename(path, path.with_extension("log.old"));
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Install a global subscriber writing to the log file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a global subscriber is
/// already installed.
pub fn init_file(path: &Path) -> Result<()> {
    let file = open_log_file(path)?;
    let layer = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false).with_target(false);

    tracing_subscriber::registry()
        .with(env_filter(DEFAULT_LEVEL))
        .with(layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Install a global subscriber writing compact lines to stderr.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_stderr(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { DEFAULT_LEVEL };
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false).compact();

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Extract the message from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

/// Install a panic hook that logs panics before running the previous hook.
///
/// A panic in the MCP server otherwise only reaches stderr, which the
/// client usually discards.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let location = info.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()),
        );
        tracing::error!(%location, payload = %panic_message(info.payload()), "panic");
        original_hook(info);
    }));
}

/// A guard that logs tool call duration when dropped.
///
/// ```ignore
/// let mut guard = ToolCallGuard::new("get_workflow_status");
/// // ... execute tool, calling guard.mark_error() on failure ...
/// ```
pub struct ToolCallGuard {
    tool_name: &'static str,
    start: Instant,
    success: bool,
}

impl ToolCallGuard {
    /// Create a new tool call guard and log the start.
    #[must_use]
    pub fn new(tool_name: &'static str) -> Self {
        tracing::info!(tool = tool_name, "tool call started");
        Self { tool_name, start: Instant::now(), success: true }
    }

    /// Mark the tool call as failed.
    pub fn mark_error(&mut self) {
        self.success = false;
    }
}

impl Drop for ToolCallGuard {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_millis();
        if self.success {
            tracing::info!(tool = self.tool_name, duration_ms, "tool call finished");
        } else {
            tracing::warn!(tool = self.tool_name, duration_ms, "tool call failed");
        }
    }
}
