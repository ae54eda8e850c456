//! GitHub webhook event log: capture model, durable store and queries.
//!
//! The webhook receiver appends [`Event`]s through an [`EventStore`]; the MCP
//! server reads them back through the functions in [`query`]. The two sides
//! run in different processes and share nothing but the events file.

mod models;
pub mod query;
mod store;

pub use models::{Event, WorkflowRunSnapshot, UNKNOWN_EVENT_TYPE, WORKFLOW_RUN_EVENT};
pub use query::{recent_events, workflow_status, WorkflowStatus, DEFAULT_RECENT_LIMIT};
pub use store::{EventStore, MAX_EVENTS};
