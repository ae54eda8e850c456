//! Helpers for shaping `git diff` output for an agent.

use serde::Serialize;

/// A diff cut down to a line budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedDiff {
    /// The diff text, with a notice appended if lines were dropped.
    pub content: String,
    /// Whether any lines were dropped.
    pub truncated: bool,
    /// Line count of the full diff.
    pub total_lines: usize,
}

/// Keep at most `max_lines` lines of `diff`.
///
/// Lines are counted by splitting on `\n`, so a trailing newline counts as
/// one extra (empty) line.
pub fn truncate_diff(diff: &str, max_lines: usize) -> TruncatedDiff {
    let lines: Vec<&str> = diff.split('\n').collect();
    let total_lines = lines.len();

    if total_lines <= max_lines {
        return TruncatedDiff { content: diff.to_string(), truncated: false, total_lines };
    }

    let mut content = lines[..max_lines].join("\n");
    content.push_str(&format!(
        "\n\n... Output truncated. Showing {max_lines} of {total_lines} lines ..."
    ));
    content.push_str("\n... Use max_diff_lines parameter to see more ...");

    TruncatedDiff { content, truncated: true, total_lines }
}

/// One entry of `git diff --name-status` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFile {
    /// Status letter(s), e.g. `M`, `A`, `D`, `R100`.
    pub status: String,
    /// Path in the new tree (the destination for renames and copies).
    pub path: String,
}

/// Parse `git diff --name-status` output.
///
/// Lines that do not have a status and at least one path are skipped.
pub fn parse_name_status(output: &str) -> Vec<ChangedFile> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let status = fields.next()?.trim();
            let path = fields.last()?.trim();
            if status.is_empty() || path.is_empty() {
                return None;
            }
            Some(ChangedFile { status: status.to_string(), path: path.to_string() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_diff_untouched() {
        let result = truncate_diff("line1\nline2\n", 10);
        assert!(!result.truncated);
        assert_eq!(result.content, "line1\nline2\n");
        assert_eq!(result.total_lines, 3);
    }

    #[test]
    fn test_long_diff_truncated_with_notice() {
        let diff = (1..=10).map(|n| format!("line{n}")).collect::<Vec<_>>().join("\n");
        let result = truncate_diff(&diff, 3);

        assert!(result.truncated);
        assert_eq!(result.total_lines, 10);
        assert!(result.content.starts_with("line1\nline2\nline3\n\n"));
        assert!(!result.content.contains("line4"));
        assert!(result.content.contains("Showing 3 of 10 lines"));
        assert!(result.content.ends_with("... Use max_diff_lines parameter to see more ..."));
    }

    #[test]
    fn test_exact_budget_not_truncated() {
        let result = truncate_diff("a\nb\nc", 3);
        assert!(!result.truncated);
    }

    #[test]
    fn test_parse_name_status() {
        let output = "M\tsrc/lib.rs\nA\tdocs/new.md\nD\told.txt\nR087\tsrc/a.rs\tsrc/b.rs\n";
        let files = parse_name_status(output);
        assert_eq!(
            files,
            vec![
                ChangedFile { status: "M".to_string(), path: "src/lib.rs".to_string() },
                ChangedFile { status: "A".to_string(), path: "docs/new.md".to_string() },
                ChangedFile { status: "D".to_string(), path: "old.txt".to_string() },
                ChangedFile { status: "R087".to_string(), path: "src/b.rs".to_string() },
            ]
        );
    }

    #[test]
    fn test_parse_name_status_skips_blank_and_malformed() {
        assert!(parse_name_status("").is_empty());
        assert!(parse_name_status("\n\nM\n").is_empty());
    }
}
