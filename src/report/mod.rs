use clap::ValueEnum;
use crossterm::style::{Color, Stylize};
use serde::{Deserialize, Deserializer};

const NO_ISSUES_MARKDOWN: &str =
    "## Code Review\n\nNo issues found. Checked for bugs and guideline compliance.";

/// Where the rendered review will be posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    Github,
    Gitlab,
    Terminal,
    Markdown,
}

/// A review finding as produced by the reviewer.
///
/// Every field is optional in the input JSON; `null` counts as absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    #[serde(default = "default_description", deserialize_with = "description_or_default")]
    pub description: String,
    #[serde(default = "default_reason", deserialize_with = "reason_or_default")]
    pub reason: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub file: String,
    #[serde(default = "default_start_line", deserialize_with = "start_line_or_default")]
    pub start_line: u32,
    /// Defaults to `start_line` when absent.
    #[serde(default)]
    pub end_line: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestion: String,
}

fn default_description() -> String {
    "No description".to_string()
}

fn default_reason() -> String {
    "unknown".to_string()
}

fn default_start_line() -> u32 {
    1
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn description_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_description))
}

fn reason_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_reason))
}

fn start_line_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_start_line))
}

impl Issue {
    pub fn end_line(&self) -> u32 {
        self.end_line.unwrap_or(self.start_line)
    }
}

/// Repository coordinates used to build source links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    /// `owner/repo`
    pub repo: String,
    pub sha: String,
}

/// Render `issues` for `platform`.
pub fn format_review(platform: Platform, issues: &[Issue], target: &LinkTarget) -> String {
    match platform {
        Platform::Github => format_linked(issues, |issue| {
            format!(
                "https://github.com/{}/blob/{}/{}#L{}-L{}",
                target.repo,
                target.sha,
                issue.file,
                issue.start_line,
                issue.end_line()
            )
        }),
        Platform::Gitlab => format_linked(issues, |issue| {
            format!(
                "https://gitlab.com/{}/-/blob/{}/{}#L{}",
                target.repo, target.sha, issue.file, issue.start_line
            )
        }),
        Platform::Terminal => format_terminal(issues),
        Platform::Markdown => format_markdown(issues),
    }
}

fn heading(count: usize) -> String {
    format!("## Code Review\n\nFound {} issue(s):\n", count)
}

/// PR/MR comment body with one source link per issue.
fn format_linked(issues: &[Issue], link: impl Fn(&Issue) -> String) -> String {
    if issues.is_empty() {
        return NO_ISSUES_MARKDOWN.to_string();
    }

    let mut lines = vec![heading(issues.len())];
    for (n, issue) in issues.iter().enumerate() {
        lines.push(format!(
            "{}. **{}** ({})\n",
            n + 1,
            issue.description,
            issue.reason
        ));
        lines.push(format!("   {}\n", link(issue)));
        if !issue.suggestion.is_empty() {
            lines.push(format!("\n   > Suggestion: {}\n", issue.suggestion));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn format_markdown(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return NO_ISSUES_MARKDOWN.to_string();
    }

    let mut lines = vec![heading(issues.len())];
    for (n, issue) in issues.iter().enumerate() {
        lines.push(format!("### {}. {}\n", n + 1, issue.description));
        lines.push(format!("- **Reason**: {}", issue.reason));
        lines.push(format!("- **File**: `{}`", issue.file));
        lines.push(format!(
            "- **Lines**: {}-{}",
            issue.start_line,
            issue.end_line()
        ));
        if !issue.suggestion.is_empty() {
            lines.push(format!("- **Suggestion**: {}", issue.suggestion));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn reason_color(reason: &str) -> Option<Color> {
    match reason {
        "bug" => Some(Color::Red),
        "guideline" => Some(Color::Yellow),
        "context" => Some(Color::Blue),
        "style" => Some(Color::DarkGrey),
        _ => None,
    }
}

fn format_terminal(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return "✓ Code Review: No issues found".green().to_string();
    }

    let mut lines = vec![format!(
        "{}\n",
        format!("⚠ Code Review: Found {} issue(s)", issues.len()).yellow()
    )];
    for (n, issue) in issues.iter().enumerate() {
        let title = format!("{}. {}", n + 1, issue.description);
        lines.push(match reason_color(&issue.reason) {
            Some(color) => title.with(color).to_string(),
            None => title,
        });
        lines.push(format!("   Reason: {}", issue.reason));
        lines.push(format!("   File: {}", issue.file));
        lines.push(format!(
            "   Lines: {}-{}",
            issue.start_line,
            issue.end_line()
        ));
        if !issue.suggestion.is_empty() {
            lines.push(
                format!("   Suggestion: {}", issue.suggestion)
                    .green()
                    .to_string(),
            );
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
