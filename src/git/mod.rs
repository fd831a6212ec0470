use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git command failed: {0}")]
    CommandFailed(String),
    #[error("invalid git ref: {0}")]
    InvalidRef(String),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GitError>;

/// Validate a user-supplied diff range before handing it to git.
///
/// Allows: alphanumeric, dash, underscore, slash, dot, tilde, caret, @, colon, braces
pub fn validate_git_ref(ref_str: &str) -> Result<()> {
    if ref_str.is_empty() {
        return Err(GitError::InvalidRef("Empty git ref".to_string()));
    }

    // A leading dash would reach git as an option
    if ref_str.starts_with('-') {
        return Err(GitError::InvalidRef(format!(
            "Git ref may not start with '-': '{}'",
            ref_str
        )));
    }

    for ch in ref_str.chars() {
        if !ch.is_alphanumeric()
            && !matches!(
                ch,
                '-' | '_' | '/' | '.' | '~' | '^' | '@' | ':' | '{' | '}'
            )
        {
            return Err(GitError::InvalidRef(format!(
                "Invalid character in git ref: '{}'",
                ch
            )));
        }
    }

    Ok(())
}

/// Get `git diff` output for a range such as `HEAD` or `main..feature`.
pub fn get_diff(range: &str) -> Result<String> {
    validate_git_ref(range)?;
    log::debug!("running git diff {}", range);

    let output = Command::new("git")
        .arg("diff")
        .arg(range)
        .arg("--")
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CommandFailed(format!(
            "git diff failed: {}",
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout).map_err(GitError::from)
}
