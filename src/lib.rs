//! # `pr_agent`
//!
//! Tools for AI agents working on pull requests: git change analysis, PR
//! description templates, and GitHub Actions status from captured webhook
//! events. Exposed over MCP (`pr-agent-mcp`), a command-line interface
//! (`pr-agent`) and an HTTP webhook receiver (`webhook-server`).

#[cfg(feature = "cli")]
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod git;
pub mod logging;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod paths;
pub mod pr_templates;
pub mod templates;
pub mod testing;
pub mod traits;
#[cfg(feature = "webhook")]
pub mod webhook;

pub use command::RealCommandRunner;
pub use error::{Error, Result};
pub use traits::{CommandOutput, CommandRunner};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
