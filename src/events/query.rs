//! Read-side queries over the event log.
//!
//! Both queries re-read the store on every call; nothing is cached, so a
//! workflow whose runs were evicted from the capped log simply disappears.

use super::models::{Event, WorkflowRunSnapshot};
use super::store::EventStore;
use crate::error::Result;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Number of events returned by [`recent_events`] when the caller has no
/// preference.
pub const DEFAULT_RECENT_LIMIT: i64 = 10;

/// Return up to `limit` events, newest first.
///
/// Events with equal timestamps keep their log order. A `limit` of zero or
/// less, or one larger than the log, returns every event.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn recent_events(store: &EventStore, limit: i64) -> Result<Vec<Event>> {
    let mut events = store.read_all()?;
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    if let Some(limit) = usize::try_from(limit).ok().filter(|&n| n > 0) {
        events.truncate(limit);
    }
    Ok(events)
}

/// Outcome of a workflow status query.
///
/// Only [`WorkflowStatus::Latest`] carries data; the other variants are
/// informational empty results rather than errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowStatus {
    /// The events file has never been written.
    NoEventsFile,
    /// The log holds no workflow run notifications.
    NoWorkflowRuns,
    /// No workflow run matched the requested name.
    NoRunsForWorkflow(String),
    /// Latest known run per workflow name.
    Latest(BTreeMap<String, WorkflowRunSnapshot>),
}

impl WorkflowStatus {
    /// Human-readable description of an empty result.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::NoEventsFile => {
                Some("No events file found. No workflows to report.".to_string())
            }
            Self::NoWorkflowRuns => Some("No workflow run events found.".to_string()),
            Self::NoRunsForWorkflow(name) => {
                Some(format!("No workflow runs found for '{name}'."))
            }
            Self::Latest(_) => None,
        }
    }
}

impl Serialize for WorkflowStatus {
    /// Empty results serialize as `{"status": "<message>"}`; data serializes
    /// as a map from workflow name to snapshot.
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Latest(latest) => latest.serialize(serializer),
            other => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("status", &other.message())?;
                map.end()
            }
        }
    }
}

/// Report the latest run of each workflow, optionally for one workflow only.
///
/// The name filter is exact and case-sensitive; an empty name means no
/// filter. For each workflow the run with the largest run id wins, wherever
/// it sits in the log.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn workflow_status(store: &EventStore, workflow_name: Option<&str>) -> Result<WorkflowStatus> {
    if !store.exists() {
        return Ok(WorkflowStatus::NoEventsFile);
    }

    let events = store.read_all()?;
    let mut runs: Vec<&Event> = events.iter().filter(|e| e.is_workflow_run()).collect();
    if runs.is_empty() {
        return Ok(WorkflowStatus::NoWorkflowRuns);
    }

    if let Some(name) = workflow_name.filter(|n| !n.is_empty()) {
        runs.retain(|e| e.workflow_name() == Some(name));
        if runs.is_empty() {
            return Ok(WorkflowStatus::NoRunsForWorkflow(name.to_string()));
        }
    }

    let mut latest: BTreeMap<String, WorkflowRunSnapshot> = BTreeMap::new();
    for event in runs {
        let Some(name) = event.workflow_name() else {
            continue;
        };
        let snapshot = WorkflowRunSnapshot::from_event(event);
        match latest.get(name) {
            Some(current) if !snapshot.supersedes(current) => {}
            _ => {
                latest.insert(name.to_string(), snapshot);
            }
        }
    }

    Ok(WorkflowStatus::Latest(latest))
}
