//! MCP server exposing the PR agent tools and prompts.
//!
//! Every tool answers with pretty-printed JSON text. Failures are caught per
//! call and returned as an error result carrying `{"error": "..."}` so the
//! agent sees the message instead of a protocol fault.

// The rmcp `#[tool(aggr)]` macro requires ownership of input structs,
// making pass-by-value necessary for all tool handler functions.
#![allow(clippy::needless_pass_by_value)]

use crate::command::RealCommandRunner;
use crate::config::Settings;
use crate::error::Result as PrResult;
use crate::events::{self, EventStore, DEFAULT_RECENT_LIMIT};
use crate::git::{self, AnalyzeOptions, DEFAULT_BASE_BRANCH, DEFAULT_MAX_DIFF_LINES};
use crate::logging::ToolCallGuard;
use crate::{pr_templates, templates};
use rmcp::model::{
    CallToolResult, Content, GetPromptRequestParam, GetPromptResult, Implementation,
    JsonObject, ListPromptsResult, PaginatedRequestParam, Prompt, PromptArgument, PromptMessage,
    PromptMessageRole, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{tool, Error as McpError, RoleServer};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Instructions for the MCP server, shown to agents using this server.
const INSTRUCTIONS: &str = r"PR agent server. Helps write pull request descriptions and keep an eye on GitHub Actions.

## Pull requests

1. Call `analyze_file_changes` to see what changed between the base branch and HEAD. Large diffs are truncated; raise `max_diff_lines` or set `include_diff` to false if you only need the file list.
2. Decide what kind of change it is (bug, feature, docs, refactor, test, performance, security).
3. Call `suggest_template` with your summary and change type, then fill in the recommended template.

`get_pr_templates` lists every template with its content.

## CI/CD

GitHub webhook events are captured by the separate `webhook-server` process. `get_recent_actions_events` returns the newest events; `get_workflow_status` reports the latest run of each workflow. If no events file exists yet, the webhook server has not received anything.

The prompts `analyze_ci_results`, `create_deployment_summary`, `generate_pr_status_report` and `troubleshoot_workflow_failure` walk through common workflows using these tools.
";

/// MCP server for PR descriptions and GitHub Actions monitoring.
#[derive(Clone)]
pub struct PrAgentServer {
    store: Arc<EventStore>,
    templates_dir: PathBuf,
    runner: RealCommandRunner,
}

impl PrAgentServer {
    /// Create a server for resolved project settings.
    ///
    /// Git commands run inside the project directory.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            store: Arc::new(EventStore::new(&settings.events_file)),
            templates_dir: settings.templates_dir.clone(),
            runner: RealCommandRunner::in_dir(&settings.project_dir),
        }
    }

    /// The event store the server reads from.
    #[must_use]
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Describe every prompt for `prompts/list`.
    fn prompt_list() -> Vec<Prompt> {
        templates::PROMPTS
            .iter()
            .map(|prompt_def| {
                let arguments: Vec<PromptArgument> = prompt_def
                    .arguments
                    .iter()
                    .map(|arg| PromptArgument {
                        name: arg.name.to_string(),
                        description: Some(arg.description.to_string()),
                        required: Some(arg.required),
                    })
                    .collect();
                Prompt {
                    name: prompt_def.name.to_string(),
                    description: Some(prompt_def.description.to_string()),
                    arguments: (!arguments.is_empty()).then_some(arguments),
                }
            })
            .collect()
    }

    /// Render one prompt for `prompts/get`.
    fn prompt_result(
        name: &str,
        arguments: Option<&JsonObject>,
    ) -> Result<GetPromptResult, McpError> {
        let prompt_def = templates::find_prompt(name)
            .ok_or_else(|| McpError::invalid_params(format!("Unknown prompt: {name}"), None))?;

        let values: BTreeMap<String, String> = arguments
            .into_iter()
            .flatten()
            .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
            .collect();

        let text = templates::render_prompt(prompt_def.name, &values)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        tracing::info!(prompt = prompt_def.name, "prompt rendered");
        Ok(GetPromptResult {
            description: Some(prompt_def.description.to_string()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

// Tool input schemas

/// Input for analyzing file changes.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeFileChangesInput {
    /// Base branch to compare against (default: main).
    #[serde(default = "default_base_branch")]
    pub base_branch: String,
    /// Include the full diff content (default: true).
    #[serde(default = "default_include_diff")]
    pub include_diff: bool,
    /// Maximum number of diff lines to include (default: 500).
    #[serde(default = "default_max_diff_lines")]
    pub max_diff_lines: usize,
}

fn default_base_branch() -> String {
    DEFAULT_BASE_BRANCH.to_string()
}

const fn default_include_diff() -> bool {
    true
}

const fn default_max_diff_lines() -> usize {
    DEFAULT_MAX_DIFF_LINES
}

/// Input for suggesting a PR template.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SuggestTemplateInput {
    /// Your analysis of what the changes do.
    pub changes_summary: String,
    /// The type of change you've identified (bug, feature, docs, refactor, test, etc.).
    pub change_type: String,
}

/// Input for listing recent webhook events.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecentEventsInput {
    /// Maximum number of events to return (default: 10, 0 for all).
    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_limit() -> i64 {
    DEFAULT_RECENT_LIMIT
}

/// Input for querying workflow status.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WorkflowStatusInput {
    /// Optional workflow name to filter by (exact match).
    #[serde(default)]
    pub workflow_name: Option<String>,
}

/// Turn a tool outcome into a call result, logging and flagging failures.
fn finish<T: Serialize>(
    mut guard: ToolCallGuard,
    outcome: PrResult<T>,
) -> Result<CallToolResult, McpError> {
    match outcome {
        Ok(value) => {
            let json = serde_json::to_string_pretty(&value)
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;
            Ok(CallToolResult::success(vec![Content::text(json)]))
        }
        Err(e) => {
            guard.mark_error();
            tracing::warn!(error = %e, "tool call returned an error");
            let json = serde_json::to_string_pretty(&serde_json::json!({ "error": e.to_string() }))
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;
            Ok(CallToolResult::error(vec![Content::text(json)]))
        }
    }
}

// Tool implementations
// Note: rmcp macros require pass-by-value for input parameters

#[tool(tool_box)]
impl PrAgentServer {
    /// Analyze changes between a base branch and HEAD.
    #[tool(
        description = "Get the full diff and list of changed files in the current git repository, compared against a base branch."
    )]
    fn analyze_file_changes(
        &self,
        #[tool(aggr)] input: AnalyzeFileChangesInput,
    ) -> Result<CallToolResult, McpError> {
        let guard = ToolCallGuard::new("analyze_file_changes");
        let options = AnalyzeOptions {
            base_branch: input.base_branch,
            include_diff: input.include_diff,
            max_diff_lines: input.max_diff_lines,
        };
        finish(guard, git::analyze_file_changes(&self.runner, &options))
    }

    /// List the PR templates.
    #[tool(description = "List available PR templates with their content.")]
    fn get_pr_templates(&self) -> Result<CallToolResult, McpError> {
        let guard = ToolCallGuard::new("get_pr_templates");
        finish(guard, pr_templates::list_templates(&self.templates_dir))
    }

    /// Suggest a PR template for an analyzed change.
    #[tool(
        description = "Suggest the most appropriate PR template for changes you have analyzed, based on your summary and the type of change."
    )]
    fn suggest_template(
        &self,
        #[tool(aggr)] input: SuggestTemplateInput,
    ) -> Result<CallToolResult, McpError> {
        let guard = ToolCallGuard::new("suggest_template");
        finish(
            guard,
            pr_templates::suggest_template(
                &self.templates_dir,
                &input.changes_summary,
                &input.change_type,
            ),
        )
    }

    /// List recent webhook events, newest first.
    #[tool(description = "Get recent GitHub Actions events received via webhook, newest first.")]
    fn get_recent_actions_events(
        &self,
        #[tool(aggr)] input: RecentEventsInput,
    ) -> Result<CallToolResult, McpError> {
        let guard = ToolCallGuard::new("get_recent_actions_events");
        finish(guard, events::recent_events(&self.store, input.limit))
    }

    /// Report the latest run of each workflow.
    #[tool(
        description = "Get the current status of GitHub Actions workflows, optionally for a single workflow name."
    )]
    fn get_workflow_status(
        &self,
        #[tool(aggr)] input: WorkflowStatusInput,
    ) -> Result<CallToolResult, McpError> {
        let guard = ToolCallGuard::new("get_workflow_status");
        finish(guard, events::workflow_status(&self.store, input.workflow_name.as_deref()))
    }
}

#[rmcp::tool(tool_box)]
impl rmcp::ServerHandler for PrAgentServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_prompts().enable_tools().build(),
            server_info: Implementation {
                name: "pr-agent".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_prompts(
        &self,
        _request: PaginatedRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult { next_cursor: None, prompts: Self::prompt_list() })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        Self::prompt_result(&request.name, request.arguments.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Event, WORKFLOW_RUN_EVENT};
    use crate::testing::workflow_run_payload;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn create_test_server() -> (TempDir, PrAgentServer) {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            project_dir: dir.path().to_path_buf(),
            events_file: dir.path().join("github_events.json"),
            templates_dir: dir.path().join("templates"),
            webhook_host: "localhost".to_string(),
            webhook_port: 8080,
        };
        (dir, PrAgentServer::new(&settings))
    }

    /// Return the result's error flag and its JSON text payload.
    fn unpack(result: &CallToolResult) -> (bool, Value) {
        let raw = serde_json::to_value(result).unwrap();
        let is_error = raw["isError"].as_bool().unwrap_or(false);
        let text = raw["content"][0]["text"].as_str().unwrap();
        (is_error, serde_json::from_str(text).unwrap())
    }

    #[test]
    fn test_recent_events_empty_store() {
        let (_dir, server) = create_test_server();
        let result =
            server.get_recent_actions_events(RecentEventsInput { limit: 10 }).unwrap();
        assert_eq!(unpack(&result), (false, json!([])));
    }

    #[test]
    fn test_recent_events_newest_first() {
        let (_dir, server) = create_test_server();
        let first = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let second = first + Duration::seconds(30);
        server.store().append(Event::at(first, Some("push"), json!({"n": 1}))).unwrap();
        server.store().append(Event::at(second, Some("push"), json!({"n": 2}))).unwrap();

        let result = server.get_recent_actions_events(RecentEventsInput { limit: 1 }).unwrap();
        let (is_error, value) = unpack(&result);
        assert!(!is_error);
        let events = value.as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event_type"], "push");
        assert_eq!(events[0]["payload"], json!({"n": 2}));
    }

    #[test]
    fn test_recent_events_corrupt_store_is_error_result() {
        let (_dir, server) = create_test_server();
        std::fs::write(server.store().path(), "not an array").unwrap();

        let result = server.get_recent_actions_events(RecentEventsInput { limit: 10 }).unwrap();
        let (is_error, value) = unpack(&result);
        assert!(is_error);
        assert!(value["error"].as_str().unwrap().contains("Failed to read or parse events file"));
    }

    #[test]
    fn test_workflow_status_without_events_file() {
        let (_dir, server) = create_test_server();
        let result =
            server.get_workflow_status(WorkflowStatusInput { workflow_name: None }).unwrap();
        assert_eq!(
            unpack(&result),
            (false, json!({"status": "No events file found. No workflows to report."}))
        );
    }

    #[test]
    fn test_workflow_status_reports_latest_run() {
        let (_dir, server) = create_test_server();
        for id in [7, 5] {
            server
                .store()
                .append(Event::received(
                    Some(WORKFLOW_RUN_EVENT),
                    workflow_run_payload(
                        "deploy",
                        Some(id),
                        "completed",
                        Some("success"),
                        "2024-06-01T12:00:00Z",
                    ),
                ))
                .unwrap();
        }

        let input = WorkflowStatusInput { workflow_name: Some("deploy".to_string()) };
        let (is_error, value) = unpack(&server.get_workflow_status(input).unwrap());
        assert!(!is_error);
        assert_eq!(value["deploy"]["id"], 7);
        assert_eq!(value["deploy"]["conclusion"], "success");
    }

    #[test]
    fn test_get_pr_templates() {
        let (_dir, server) = create_test_server();
        let (is_error, value) = unpack(&server.get_pr_templates().unwrap());
        assert!(!is_error);
        assert_eq!(value.as_array().unwrap().len(), 7);
        assert_eq!(value[0]["filename"], "bug.md");
        assert_eq!(value[0]["type"], "Bug Fix");
    }

    #[test]
    fn test_suggest_template() {
        let (_dir, server) = create_test_server();
        let input = SuggestTemplateInput {
            changes_summary: "Tighten token validation".to_string(),
            change_type: "security".to_string(),
        };
        let (is_error, value) = unpack(&server.suggest_template(input).unwrap());
        assert!(!is_error);
        assert_eq!(value["recommended_template"]["filename"], "security.md");
        assert_eq!(value["template_content"], value["recommended_template"]["content"]);
    }

    #[test]
    fn test_analyze_outside_repository_is_error_result() {
        let (_dir, server) = create_test_server();
        let input = AnalyzeFileChangesInput {
            base_branch: default_base_branch(),
            include_diff: default_include_diff(),
            max_diff_lines: default_max_diff_lines(),
        };
        let (is_error, value) = unpack(&server.analyze_file_changes(input).unwrap());
        assert!(is_error);
        assert!(value["error"].is_string());
    }

    #[test]
    fn test_input_defaults() {
        let input: AnalyzeFileChangesInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(input.base_branch, "main");
        assert!(input.include_diff);
        assert_eq!(input.max_diff_lines, 500);

        let input: RecentEventsInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(input.limit, 10);

        let input: WorkflowStatusInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(input.workflow_name, None);
    }

    #[test]
    fn test_prompt_list() {
        let prompts = PrAgentServer::prompt_list();
        let names: Vec<&str> = prompts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "analyze_ci_results",
                "create_deployment_summary",
                "generate_pr_status_report",
                "troubleshoot_workflow_failure"
            ]
        );
        assert!(prompts[0].arguments.is_none());
        let args = prompts[3].arguments.as_ref().unwrap();
        assert_eq!(args[0].name, "workflow_name");
        assert_eq!(args[0].required, Some(false));
    }

    #[test]
    #[serial_test::serial]
    fn test_prompt_result_with_argument() {
        templates::reset_cache().unwrap();
        let mut arguments = JsonObject::new();
        arguments.insert("workflow_name".to_string(), json!("ci"));

        let result =
            PrAgentServer::prompt_result("troubleshoot_workflow_failure", Some(&arguments))
                .unwrap();
        assert_eq!(result.messages.len(), 1);
        let rendered = serde_json::to_value(&result.messages[0]).unwrap();
        assert_eq!(rendered["role"], "user");
        assert!(rendered["content"]["text"].as_str().unwrap().contains("named \"ci\""));
    }

    #[test]
    fn test_unknown_prompt_is_invalid_params() {
        assert!(PrAgentServer::prompt_result("nope", None).is_err());
    }

    #[test]
    fn test_server_info() {
        let (_dir, server) = create_test_server();
        let info = rmcp::ServerHandler::get_info(&server);
        assert_eq!(info.server_info.name, "pr-agent");
        assert!(info.capabilities.prompts.is_some());
        assert!(info.capabilities.tools.is_some());
    }
}
