//! Webhook receiver binary.
//!
//! Listens for GitHub webhook deliveries and appends them to the events file
//! the MCP server reads.

use clap::Parser;
use pr_agent::config::Settings;
use pr_agent::events::EventStore;
use pr_agent::{logging, webhook};
use std::path::PathBuf;
use std::sync::Arc;

/// Receive GitHub webhook events for the PR agent.
#[derive(Parser, Debug)]
#[command(name = "webhook-server", version, about)]
struct Args {
    /// Host to bind (default from config, else localhost).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (default from config, else 8080).
    #[arg(long)]
    port: Option<u16>,

    /// Events file to append to (default from config, else the project data directory).
    #[arg(long)]
    events_file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init_stderr(args.verbose)?;

    let project_dir = std::env::current_dir()?;
    let mut settings = Settings::resolve(&project_dir)?;
    if let Some(host) = args.host {
        settings.webhook_host = host;
    }
    if let Some(port) = args.port {
        settings.webhook_port = port;
    }
    if let Some(events_file) = args.events_file {
        settings.events_file = events_file;
    }

    let store = Arc::new(EventStore::new(settings.events_file.clone()));
    webhook::serve(&settings.webhook_addr(), store).await?;
    Ok(())
}
