//! Path utilities for determining data storage locations.
//!
//! The webhook receiver and the MCP server run as separate processes, so they
//! must agree on where the events file lives without talking to each other.
//! Both derive it from the project directory: data is stored in
//! `~/.pr-agent/projects/<name>-<hash>/`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// The base directory name for pr-agent data.
const DATA_DIR_NAME: &str = ".pr-agent";

/// The events log filename.
pub const EVENTS_FILENAME: &str = "github_events.json";

/// The MCP server log filename.
pub const LOG_FILENAME: &str = "mcp.log";

/// Get the base data directory for pr-agent.
///
/// Returns `~/.pr-agent/` or `None` if the home directory cannot be
/// determined.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// Get the project-specific data directory.
///
/// Returns `~/.pr-agent/projects/<readable-hash>/`, or `None` if the home
/// directory cannot be determined.
#[must_use]
pub fn project_data_dir(project_dir: &Path) -> Option<PathBuf> {
    let base = data_dir()?;
    let dir_name = create_project_dir_name(project_dir);
    Some(base.join("projects").join(dir_name))
}

/// Default location of the events file for a project.
#[must_use]
pub fn project_events_path(project_dir: &Path) -> Option<PathBuf> {
    project_data_dir(project_dir).map(|dir| dir.join(EVENTS_FILENAME))
}

/// Default location of the MCP server log for a project.
#[must_use]
pub fn project_log_path(project_dir: &Path) -> Option<PathBuf> {
    project_data_dir(project_dir).map(|dir| dir.join(LOG_FILENAME))
}

/// Create a directory name for a project.
///
/// Format: `<project-name>-<hash>` e.g., `my-project-a1b2c3d4e5f60718`
fn create_project_dir_name(project_dir: &Path) -> String {
    let path_to_hash = project_dir.canonicalize().unwrap_or_else(|_| project_dir.to_path_buf());

    let prefix = path_to_hash.file_name().and_then(|n| n.to_str()).unwrap_or("project");
    let prefix: String =
        prefix.chars().map(|c| if c.is_alphanumeric() { c } else { '-' }).collect();
    let prefix = prefix.trim_matches('-');

    let hash = hash_path(&path_to_hash);

    format!("{prefix}-{hash:016x}")
}

/// Compute a stable hash of a path.
fn hash_path(path: &Path) -> u64 {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    hasher.finish()
}
