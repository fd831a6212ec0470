use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::parser::DEFAULT_MAX_TRIVIAL_LINES;
use crate::report::Platform;
use crate::score::{Evidence, IssueType};

#[derive(Parser, Debug)]
#[command(
    name = "code-review",
    about = "Analyze unified diffs and prepare code review output"
)]
pub struct Cli {
    /// Diff file to analyze. Shorthand for `analyze <path>`; reads stdin when omitted.
    pub input: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a unified diff and print per-file statistics as JSON.
    Analyze(AnalyzeArgs),
    /// Compute a confidence score for a review finding.
    Score(ScoreArgs),
    /// Render a JSON list of review issues for a target platform.
    Format(FormatArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Diff file to analyze. Reads stdin when omitted.
    pub input: Option<PathBuf>,

    /// Analyze `git diff <RANGE>` instead of a file or stdin (e.g., "main..HEAD").
    #[arg(long, value_name = "RANGE", conflicts_with = "input")]
    pub git: Option<String>,

    /// Print single-line JSON instead of pretty-printed output.
    #[arg(long)]
    pub compact: bool,

    /// A diff is trivial only when fewer lines than this changed.
    #[arg(long, default_value_t = DEFAULT_MAX_TRIVIAL_LINES)]
    pub max_trivial_lines: usize,

    /// Source-code extension (e.g. ".rs"); repeat to replace the default set.
    #[arg(long = "code-ext", value_name = "EXT")]
    pub code_extensions: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Type of issue.
    #[arg(long = "type", value_enum)]
    pub issue_type: IssueType,

    /// Strength of evidence.
    #[arg(long, value_enum)]
    pub evidence: Evidence,

    /// Has the issue been verified? ("true" or "false")
    #[arg(long, default_value = "false", action = ArgAction::Set, value_parser = parse_flag)]
    pub verified: bool,

    /// Is this a pre-existing issue? ("true" or "false")
    #[arg(long, default_value = "false", action = ArgAction::Set, value_parser = parse_flag)]
    pub pre_existing: bool,

    /// Would a linter catch this? ("true" or "false")
    #[arg(long, default_value = "false", action = ArgAction::Set, value_parser = parse_flag)]
    pub linter_catchable: bool,
}

#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Target platform.
    #[arg(long, value_enum)]
    pub platform: Platform,

    /// Inline JSON array (starting with '[') or a path to a JSON file. Reads stdin when omitted.
    #[arg(long)]
    pub issues: Option<String>,

    /// Repository in owner/repo format (for links).
    #[arg(long, default_value = "owner/repo")]
    pub repo: String,

    /// Commit SHA (for links).
    #[arg(long, default_value = "HEAD")]
    pub sha: String,
}

/// Lenient boolean: case-insensitive "true" is true, anything else is false.
fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(value.eq_ignore_ascii_case("true"))
}

/// Parse CLI arguments.
pub fn parse_args() -> Cli {
    Cli::parse()
}
