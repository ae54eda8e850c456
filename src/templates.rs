//! MCP prompt templates rendered with Tera.
//!
//! Prompts are compiled into the binary. A templates directory may override
//! any of them with a file of the same name (for example
//! `prompts/analyze_ci_results.tera`).

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::RwLock;
use tera::{Context, Tera};

/// Embedded default templates, keyed by template name.
static EMBEDDED_TEMPLATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(
        "prompts/analyze_ci_results.tera",
        include_str!("../templates/prompts/analyze_ci_results.tera"),
    );
    m.insert(
        "prompts/create_deployment_summary.tera",
        include_str!("../templates/prompts/create_deployment_summary.tera"),
    );
    m.insert(
        "prompts/generate_pr_status_report.tera",
        include_str!("../templates/prompts/generate_pr_status_report.tera"),
    );
    m.insert(
        "prompts/troubleshoot_workflow_failure.tera",
        include_str!("../templates/prompts/troubleshoot_workflow_failure.tera"),
    );
    m
});

/// Global template engine with caching.
static TERA: Lazy<RwLock<Option<Tera>>> = Lazy::new(|| RwLock::new(None));

/// An argument accepted by a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptArgumentDef {
    /// Argument name.
    pub name: &'static str,
    /// What the argument does.
    pub description: &'static str,
    /// Whether the prompt can be rendered without it.
    pub required: bool,
}

/// A prompt served to MCP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptDef {
    /// Prompt name as listed to clients.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Accepted arguments.
    pub arguments: &'static [PromptArgumentDef],
}

impl PromptDef {
    fn template_name(&self) -> String {
        format!("prompts/{}.tera", self.name)
    }
}

/// Every prompt, in listing order.
pub const PROMPTS: [PromptDef; 4] = [
    PromptDef {
        name: "analyze_ci_results",
        description: "Analyze recent CI/CD results and provide insights.",
        arguments: &[],
    },
    PromptDef {
        name: "create_deployment_summary",
        description: "Generate a deployment summary for team communication.",
        arguments: &[],
    },
    PromptDef {
        name: "generate_pr_status_report",
        description: "Generate a comprehensive PR status report including CI/CD results.",
        arguments: &[],
    },
    PromptDef {
        name: "troubleshoot_workflow_failure",
        description: "Help troubleshoot a failing GitHub Actions workflow.",
        arguments: &[PromptArgumentDef {
            name: "workflow_name",
            description: "Focus on a single workflow",
            required: false,
        }],
    },
];

/// Look up a prompt by name.
#[must_use]
pub fn find_prompt(name: &str) -> Option<&'static PromptDef> {
    PROMPTS.iter().find(|p| p.name == name)
}

/// Initialize the template engine, letting `.tera` files under
/// `templates_dir` override the embedded prompts.
///
/// # Errors
///
/// Returns an error if the directory contains invalid templates.
pub fn init_templates(templates_dir: Option<&Path>) -> Result<()> {
    let mut tera = Tera::default();

    if let Some(dir) = templates_dir.filter(|d| d.exists()) {
        let glob_pattern = format!("{}/**/*.tera", dir.display());
        tera = Tera::new(&glob_pattern).map_err(|e| {
            Error::Template(format!("Failed to load templates from {}: {e}", dir.display()))
        })?;
    }

    for (name, content) in EMBEDDED_TEMPLATES.iter() {
        if tera.get_template(name).is_err() {
            tera.add_raw_template(name, content)
                .map_err(|e| Error::Template(format!("Invalid embedded template {name}: {e}")))?;
        }
    }

    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = Some(tera);
    Ok(())
}

/// Render a template with the given context.
///
/// Falls back to the embedded templates if [`init_templates`] was never
/// called.
///
/// # Errors
///
/// Returns an error if the template doesn't exist or rendering fails.
pub fn render(name: &str, context: &Context) -> Result<String> {
    let needs_init = TERA.read().map_err(|e| Error::Template(e.to_string()))?.is_none();
    if needs_init {
        init_templates(None)?;
    }

    let guard = TERA.read().map_err(|e| Error::Template(e.to_string()))?;
    let tera = guard.as_ref().ok_or_else(|| Error::Template("Templates not initialized".into()))?;
    let rendered = tera
        .render(name, context)
        .map_err(|e| Error::Template(format!("Failed to render template {name}: {e}")))?;
    drop(guard);

    Ok(rendered)
}

/// Render a prompt by name.
///
/// Unknown arguments are ignored; declared arguments that were not supplied
/// render as empty.
///
/// # Errors
///
/// Returns [`Error::Template`] if there is no such prompt or it fails to
/// render.
pub fn render_prompt(name: &str, arguments: &BTreeMap<String, String>) -> Result<String> {
    let prompt_def =
        find_prompt(name).ok_or_else(|| Error::Template(format!("Unknown prompt: {name}")))?;

    let mut context = Context::new();
    for argument in prompt_def.arguments {
        let value = arguments.get(argument.name).map_or("", String::as_str);
        context.insert(argument.name, value.trim());
    }
    render(&prompt_def.template_name(), &context)
}

/// Reset the template cache, forcing re-initialization on next use.
///
/// # Errors
///
/// Returns an error if the write lock cannot be acquired.
pub fn reset_cache() -> Result<()> {
    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = None;
    Ok(())
}
