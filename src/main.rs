use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use code_review::cli::{self, AnalyzeArgs, Commands, FormatArgs, ScoreArgs};
use code_review::git::get_diff;
use code_review::parser::{DEFAULT_MAX_TRIVIAL_LINES, TrivialityPolicy, parse_diff_with};
use code_review::report::{Issue, LinkTarget, format_review};
use code_review::score::{ScoreFactors, calculate_score};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = cli::parse_args();

    match args.command {
        None => {
            // Top-level usage: code-review [path]
            handle_analyze(&AnalyzeArgs {
                input: args.input,
                git: None,
                compact: false,
                max_trivial_lines: DEFAULT_MAX_TRIVIAL_LINES,
                code_extensions: Vec::new(),
            })?;
        }
        Some(Commands::Analyze(analyze_args)) => {
            handle_analyze(&analyze_args)?;
        }
        Some(Commands::Score(score_args)) => {
            handle_score(&score_args)?;
        }
        Some(Commands::Format(format_args)) => {
            handle_format(&format_args)?;
        }
    }

    Ok(())
}

/// Handle the analyze command - parse a diff and print the analysis as JSON.
fn handle_analyze(args: &AnalyzeArgs) -> Result<()> {
    let diff_text = match (&args.git, &args.input) {
        (Some(range), _) => get_diff(range)?,
        (None, Some(path)) => read_file(path)?,
        (None, None) => read_stdin()?,
    };

    let mut policy = TrivialityPolicy {
        max_changed_lines: args.max_trivial_lines,
        ..TrivialityPolicy::default()
    };
    if !args.code_extensions.is_empty() {
        policy.code_extensions = args.code_extensions.clone();
    }

    let analysis = parse_diff_with(&diff_text, &policy);
    let json = if args.compact {
        serde_json::to_string(&analysis)?
    } else {
        serde_json::to_string_pretty(&analysis)?
    };
    println!("{}", json);

    Ok(())
}

/// Handle the score command - print the confidence score as JSON.
fn handle_score(args: &ScoreArgs) -> Result<()> {
    let result = calculate_score(ScoreFactors {
        issue_type: args.issue_type,
        evidence: args.evidence,
        verified: args.verified,
        pre_existing: args.pre_existing,
        linter_catchable: args.linter_catchable,
    });
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Handle the format command - render issues for the chosen platform.
fn handle_format(args: &FormatArgs) -> Result<()> {
    let raw = match &args.issues {
        Some(inline) if inline.starts_with('[') => inline.clone(),
        Some(path) => read_file(Path::new(path))?,
        None => read_stdin()?,
    };
    let issues: Vec<Issue> =
        serde_json::from_str(&raw).context("Failed to parse issues JSON")?;
    log::debug!("formatting {} issue(s) for {:?}", issues.len(), args.platform);

    let target = LinkTarget {
        repo: args.repo.clone(),
        sha: args.sha.clone(),
    };
    println!("{}", format_review(args.platform, &issues, &target));
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read stdin")?;
    Ok(buf)
}
