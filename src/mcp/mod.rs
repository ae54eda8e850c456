//! MCP (Model Context Protocol) server for the PR agent tools.

#[cfg(feature = "mcp")]
pub mod pr_agent_server;

#[cfg(feature = "mcp")]
pub use pr_agent_server::PrAgentServer;
