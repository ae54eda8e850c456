//! MCP server binary for the PR agent tools.
//!
//! Serves over stdio. Logs go to the project's data directory because
//! stdout carries the protocol.

use pr_agent::command::RealCommandRunner;
use pr_agent::config::Settings;
use pr_agent::mcp::PrAgentServer;
use pr_agent::{git, logging, paths, templates};
use rmcp::ServiceExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let project_dir = std::env::current_dir()?;
    let settings = Settings::resolve(&project_dir)?;

    // Initialize logging first (writes to ~/.pr-agent/projects/<project>/mcp.log)
    match paths::project_log_path(&project_dir) {
        Some(log_path) => {
            if let Err(e) = logging::init_file(&log_path) {
                eprintln!("Warning: MCP logging init failed: {e}");
            }
        }
        None => eprintln!("Warning: cannot determine home directory, MCP logging disabled"),
    }
    logging::install_panic_hook();

    tracing::info!(
        project = %project_dir.display(),
        events_file = %settings.events_file.display(),
        "MCP server starting"
    );
    if !git::is_git_repo(&RealCommandRunner::in_dir(&project_dir)) {
        tracing::warn!("not inside a git repository; analyze_file_changes will fail");
    }
    if let Err(e) = templates::init_templates(Some(&settings.templates_dir)) {
        tracing::warn!(error = %e, "falling back to built-in prompt templates");
    }

    let server = PrAgentServer::new(&settings);
    let service = server.serve(rmcp::transport::stdio()).await?;
    tracing::info!("MCP server running");
    service.waiting().await?;

    tracing::info!("MCP server shut down");
    Ok(())
}
