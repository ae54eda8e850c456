//! Data types for captured webhook events.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Event type recorded when the sender gives no `X-GitHub-Event` header.
pub const UNKNOWN_EVENT_TYPE: &str = "unknown";

/// Event type GitHub uses for workflow run notifications.
pub const WORKFLOW_RUN_EVENT: &str = "workflow_run";

/// One captured webhook notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// When the receiver accepted the request (not when GitHub sent it).
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Value of the `X-GitHub-Event` header, or [`UNKNOWN_EVENT_TYPE`].
    pub event_type: String,
    /// The request body exactly as parsed.
    pub payload: Value,
}

/// Parse an RFC 3339 timestamp, or an ISO-8601 one without an offset.
///
/// Logs written by other receivers may carry naive local timestamps such as
/// `2025-06-01T12:00:00.123456`; those are read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid timestamp '{raw}', expected ISO-8601"))
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

impl Event {
    /// Create an event stamped with the current time.
    ///
    /// A missing event type is recorded as [`UNKNOWN_EVENT_TYPE`].
    #[must_use]
    pub fn received(event_type: Option<&str>, payload: Value) -> Self {
        Self::at(Utc::now(), event_type, payload)
    }

    /// Create an event with an explicit capture time.
    #[must_use]
    pub fn at(timestamp: DateTime<Utc>, event_type: Option<&str>, payload: Value) -> Self {
        Self {
            timestamp,
            event_type: event_type.unwrap_or(UNKNOWN_EVENT_TYPE).to_string(),
            payload,
        }
    }

    /// Whether this is a workflow run notification carrying run details.
    #[must_use]
    pub fn is_workflow_run(&self) -> bool {
        self.event_type == WORKFLOW_RUN_EVENT
            && self.payload.get("workflow_run").is_some_and(Value::is_object)
    }

    /// The workflow name embedded in a workflow run payload.
    #[must_use]
    pub fn workflow_name(&self) -> Option<&str> {
        self.payload.get("workflow")?.get("name")?.as_str().filter(|name| !name.is_empty())
    }
}

/// Latest known state of one named workflow, derived from the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowRunSnapshot {
    /// GitHub's run identifier.
    #[serde(rename = "id")]
    pub run_id: Option<u64>,
    /// Run status, e.g. `queued`, `in_progress`, `completed`.
    pub status: Option<String>,
    /// Run conclusion, e.g. `success`, `failure`; unset while running.
    pub conclusion: Option<String>,
    /// The run's `updated_at` as reported by GitHub.
    pub timestamp: Option<String>,
}

impl WorkflowRunSnapshot {
    /// Extract the run details from a workflow run event.
    #[must_use]
    pub fn from_event(event: &Event) -> Self {
        let run = event.payload.get("workflow_run");
        let text = |field: &str| {
            run.and_then(|r| r.get(field)).and_then(Value::as_str).map(str::to_string)
        };
        Self {
            run_id: run.and_then(|r| r.get("id")).and_then(Value::as_u64),
            status: text("status"),
            conclusion: text("conclusion"),
            timestamp: text("updated_at"),
        }
    }

    /// Whether this snapshot should replace `current` as the latest run.
    ///
    /// Only a strictly larger run id wins. A snapshot without an id never
    /// replaces anything; one with an id replaces a snapshot that has none.
    #[must_use]
    pub fn supersedes(&self, current: &Self) -> bool {
        match (self.run_id, current.run_id) {
            (Some(candidate), Some(existing)) => candidate > existing,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::workflow_run_payload;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_received_defaults_event_type() {
        let event = Event::received(None, json!({}));
        assert_eq!(event.event_type, UNKNOWN_EVENT_TYPE);

        let event = Event::received(Some("push"), json!({}));
        assert_eq!(event.event_type, "push");
    }

    #[test]
    fn test_event_serialized_field_names() {
        let event = Event::received(Some("push"), json!({"ref": "main"}));
        let value = serde_json::to_value(&event).unwrap();
        assert!(value["timestamp"].is_string());
        assert_eq!(value["event_type"], "push");
        assert_eq!(value["payload"], json!({"ref": "main"}));
    }

    #[test]
    fn test_parse_timestamp_accepts_naive_iso8601() {
        let expected = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
            + chrono::Duration::microseconds(123_456);
        assert_eq!(parse_timestamp("2025-06-01T12:00:00.123456"), Some(expected));
        assert_eq!(parse_timestamp("2025-06-01T12:00:00.123456Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-06-01T14:00:00.123456+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2025-06-01T12:00:00"),
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_invalid_timestamp_fails_to_deserialize() {
        let raw = r#"{"timestamp": "yesterday", "event_type": "push", "payload": {}}"#;
        let err = serde_json::from_str::<Event>(raw).unwrap_err();
        assert!(err.to_string().contains("invalid timestamp 'yesterday'"));
    }

    #[test]
    fn test_is_workflow_run_requires_run_details() {
        let payload = workflow_run_payload("ci", Some(1), "completed", Some("success"), "t");
        assert!(Event::received(Some(WORKFLOW_RUN_EVENT), payload.clone()).is_workflow_run());
        assert!(!Event::received(Some("push"), payload).is_workflow_run());
        assert!(!Event::received(Some(WORKFLOW_RUN_EVENT), json!({"workflow": {"name": "ci"}}))
            .is_workflow_run());
    }

    #[test]
    fn test_snapshot_from_event() {
        let payload = workflow_run_payload(
            "deploy",
            Some(42),
            "completed",
            Some("failure"),
            "2024-05-01T10:00:00Z",
        );
        let event = Event::received(Some(WORKFLOW_RUN_EVENT), payload);
        assert_eq!(event.workflow_name(), Some("deploy"));

        let snapshot = WorkflowRunSnapshot::from_event(&event);
        assert_eq!(snapshot.run_id, Some(42));
        assert_eq!(snapshot.status.as_deref(), Some("completed"));
        assert_eq!(snapshot.conclusion.as_deref(), Some("failure"));
        assert_eq!(snapshot.timestamp.as_deref(), Some("2024-05-01T10:00:00Z"));

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["id"], 42);
    }

    #[test]
    fn test_supersedes() {
        let with_id = |id| WorkflowRunSnapshot {
            run_id: id,
            status: None,
            conclusion: None,
            timestamp: None,
        };
        assert!(with_id(Some(7)).supersedes(&with_id(Some(5))));
        assert!(!with_id(Some(5)).supersedes(&with_id(Some(7))));
        assert!(!with_id(Some(5)).supersedes(&with_id(Some(5))));
        assert!(with_id(Some(1)).supersedes(&with_id(None)));
        assert!(!with_id(None).supersedes(&with_id(Some(1))));
        assert!(!with_id(None).supersedes(&with_id(None)));
    }
}
