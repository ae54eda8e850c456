//! Pull-request description templates.
//!
//! The catalog is fixed: seven Markdown templates, each read from the
//! configured templates directory. A template missing from that directory
//! falls back to the copy compiled into the binary.

use crate::error::Result;
use regex::Regex;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

/// Template used when a change type matches nothing in the mapping.
pub const FALLBACK_TEMPLATE: &str = "feature.md";

/// The template catalog: file name, display type, embedded default content.
const CATALOG: [(&str, &str, &str); 7] = [
    ("bug.md", "Bug Fix", include_str!("../templates/pr/bug.md")),
    ("feature.md", "Feature", include_str!("../templates/pr/feature.md")),
    ("docs.md", "Documentation", include_str!("../templates/pr/docs.md")),
    ("refactor.md", "Refactor", include_str!("../templates/pr/refactor.md")),
    ("test.md", "Test", include_str!("../templates/pr/test.md")),
    ("performance.md", "Performance", include_str!("../templates/pr/performance.md")),
    ("security.md", "Security", include_str!("../templates/pr/security.md")),
];

/// Hint returned with every suggestion.
const USAGE_HINT: &str =
    "AI Agent can help you fill out this template based on the specific changes in your PR.";

/// A PR description template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrTemplate {
    /// File name within the templates directory.
    pub filename: String,
    /// Human-readable kind of change the template is for.
    #[serde(rename = "type")]
    pub template_type: String,
    /// Markdown body.
    pub content: String,
}

/// A recommended template for a described change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSuggestion {
    /// The chosen template.
    pub recommended_template: PrTemplate,
    /// Why it was chosen.
    pub reasoning: String,
    /// The chosen template's body, repeated for convenience.
    pub template_content: String,
    /// What to do next.
    pub usage_hint: String,
}

/// Load every template in catalog order.
///
/// # Errors
///
/// Returns an error if a template file exists but cannot be read.
pub fn list_templates(templates_dir: &Path) -> Result<Vec<PrTemplate>> {
    CATALOG
        .iter()
        .map(|(filename, template_type, embedded)| {
            let content = match std::fs::read_to_string(templates_dir.join(filename)) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => (*embedded).to_string(),
                Err(e) => return Err(e.into()),
            };
            Ok(PrTemplate {
                filename: (*filename).to_string(),
                template_type: (*template_type).to_string(),
                content,
            })
        })
        .collect()
}

/// Map a change type word to a template file name.
fn template_for_keyword(keyword: &str) -> Option<&'static str> {
    let filename = match keyword {
        "bug" | "fix" => "bug.md",
        "feature" | "enhancement" => "feature.md",
        "docs" | "documentation" => "docs.md",
        "refactor" | "cleanup" => "refactor.md",
        "test" | "testing" => "test.md",
        "performance" | "optimization" => "performance.md",
        "security" => "security.md",
        _ => return None,
    };
    Some(filename)
}

fn word_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[a-z]+").unwrap())
}

/// Pick the template file for a free-text change type.
///
/// The whole lower-cased change type is tried first, then each word in it
/// (so "security fix" picks `security.md`). Anything else gets
/// [`FALLBACK_TEMPLATE`].
pub fn match_template(change_type: &str) -> &'static str {
    let normalized = change_type.trim().to_lowercase();
    template_for_keyword(&normalized)
        .or_else(|| {
            word_regex().find_iter(&normalized).find_map(|word| template_for_keyword(word.as_str()))
        })
        .unwrap_or(FALLBACK_TEMPLATE)
}

/// Recommend a template for a change the agent has already analyzed.
///
/// # Errors
///
/// Returns an error if the templates cannot be loaded.
pub fn suggest_template(
    templates_dir: &Path,
    changes_summary: &str,
    change_type: &str,
) -> Result<TemplateSuggestion> {
    let mut templates = list_templates(templates_dir)?;
    let wanted = match_template(change_type);
    let index = templates.iter().position(|t| t.filename == wanted).unwrap_or(0);
    let selected = templates.swap_remove(index);

    tracing::debug!(change_type, template = %selected.filename, "suggested template");

    Ok(TemplateSuggestion {
        reasoning: format!(
            "Based on your analysis: '{changes_summary}', this appears to be a {change_type} change."
        ),
        template_content: selected.content.clone(),
        recommended_template: selected,
        usage_hint: USAGE_HINT.to_string(),
    })
}
