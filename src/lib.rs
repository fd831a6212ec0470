pub mod cli;
pub mod git;
pub mod parser;
pub mod report;
pub mod score;

use serde::Serialize;

/// How a file was changed by the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

/// A single diff hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hunk {
    pub old_start: u64,
    pub old_count: u64,
    pub new_start: u64,
    pub new_count: u64,
    /// Text after the closing `@@`, usually a function or section name.
    pub context: String,
    /// Raw body lines with their `+`/`-`/` ` prefixes, newline-joined.
    pub content: String,
}

/// One file's changes within a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: String,
    /// Pre-rename path, only set for renames.
    pub old_path: Option<String>,
    pub status: FileStatus,
    pub additions: usize,
    pub deletions: usize,
    pub hunks: Vec<Hunk>,
}

/// Result of analyzing a whole diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffAnalysis {
    pub files: Vec<FileChange>,
    pub total_additions: usize,
    pub total_deletions: usize,
    pub total_files: usize,
    pub is_trivial: bool,
}

impl Default for DiffAnalysis {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            total_additions: 0,
            total_deletions: 0,
            total_files: 0,
            is_trivial: true,
        }
    }
}
