use crate::{DiffAnalysis, FileChange, FileStatus, Hunk};

/// Extensions that mark a file as source code for the triviality check.
pub const DEFAULT_CODE_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".jsx", ".tsx", ".java", ".go", ".rs", ".cpp", ".c", ".h",
];

/// Changed-line count at or above which a diff is never trivial.
pub const DEFAULT_MAX_TRIVIAL_LINES: usize = 10;

/// Decides whether a parsed diff counts as a trivial change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrivialityPolicy {
    /// A diff is trivial only when fewer lines than this were added or removed.
    pub max_changed_lines: usize,
    /// Path suffixes that make any diff touching them non-trivial.
    pub code_extensions: Vec<String>,
}

impl Default for TrivialityPolicy {
    fn default() -> Self {
        Self {
            max_changed_lines: DEFAULT_MAX_TRIVIAL_LINES,
            code_extensions: DEFAULT_CODE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl TrivialityPolicy {
    /// Whether `path` ends with one of the configured source-code extensions.
    pub fn is_code_file(&self, path: &str) -> bool {
        self.code_extensions.iter().any(|ext| path.ends_with(ext))
    }

    /// Apply the policy to totals and the touched files.
    pub fn is_trivial(&self, changed_lines: usize, files: &[FileChange]) -> bool {
        changed_lines < self.max_changed_lines
            && !files.iter().any(|f| self.is_code_file(&f.path))
    }
}

/// Parse raw unified diff text using the default triviality policy.
pub fn parse_diff(input: &str) -> DiffAnalysis {
    parse_diff_with(input, &TrivialityPolicy::default())
}

/// Parse raw unified diff text into a `DiffAnalysis`.
///
/// Scans the text once, line by line. A `diff --git` header opens a file,
/// mode and rename lines refine it, and each `@@` header collects a hunk body
/// until a line that cannot belong to it. That line is not consumed, so the
/// outer scan sees it next. Malformed input never fails; it yields whatever
/// partial structure the recognized lines describe.
pub fn parse_diff_with(input: &str, policy: &TrivialityPolicy) -> DiffAnalysis {
    if input.trim().is_empty() {
        return DiffAnalysis::default();
    }

    let lines: Vec<&str> = input.split('\n').collect();
    let mut files = Vec::new();
    let mut current: Option<FileChange> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        // File header: "diff --git a/old b/new"
        if let Some(new_path) = parse_file_header(line) {
            if let Some(file) = current.take() {
                seal(&mut files, file);
            }
            current = Some(FileChange {
                path: new_path.to_string(),
                old_path: None,
                status: FileStatus::Modified,
                additions: 0,
                deletions: 0,
                hunks: Vec::new(),
            });
            i += 1;
            continue;
        }

        // Nothing before the first file header is attributed to anything
        let Some(file) = current.as_mut() else {
            i += 1;
            continue;
        };

        apply_status_line(file, line);

        if let Some(header) = parse_hunk_header(line) {
            i += 1;
            let hunk = collect_hunk(&lines, &mut i, header, file);
            file.hunks.push(hunk);
            continue;
        }

        i += 1;
    }

    if let Some(file) = current.take() {
        seal(&mut files, file);
    }

    aggregate(files, policy)
}

/// Move a finished file into the result list.
fn seal(files: &mut Vec<FileChange>, file: FileChange) {
    log::debug!(
        "sealed {} ({:?}): +{} -{} in {} hunk(s)",
        file.path,
        file.status,
        file.additions,
        file.deletions,
        file.hunks.len()
    );
    files.push(file);
}

fn aggregate(files: Vec<FileChange>, policy: &TrivialityPolicy) -> DiffAnalysis {
    let total_additions: usize = files.iter().map(|f| f.additions).sum();
    let total_deletions: usize = files.iter().map(|f| f.deletions).sum();
    let is_trivial = policy.is_trivial(total_additions + total_deletions, &files);

    log::debug!(
        "analyzed {} file(s): +{} -{}, trivial={}",
        files.len(),
        total_additions,
        total_deletions,
        is_trivial
    );

    DiffAnalysis {
        total_files: files.len(),
        files,
        total_additions,
        total_deletions,
        is_trivial,
    }
}

/// Extract the post-change path from a `diff --git a/<old> b/<new>` line.
///
/// The old path is matched greedily, so the last ` b/` that leaves both
/// sides non-empty separates the two paths.
fn parse_file_header(line: &str) -> Option<&str> {
    let paths = line.strip_prefix("diff --git a/")?;
    paths
        .rmatch_indices(" b/")
        .map(|(pos, sep)| (&paths[..pos], &paths[pos + sep.len()..]))
        .find(|(old, new)| !old.is_empty() && !new.is_empty())
        .map(|(_, new)| new)
}

/// Refine the open file's status from mode and rename lines. Last write wins.
fn apply_status_line(file: &mut FileChange, line: &str) {
    if line.starts_with("new file mode") {
        file.status = FileStatus::Added;
    } else if line.starts_with("deleted file mode") {
        file.status = FileStatus::Deleted;
    } else if let Some(from) = line.strip_prefix("rename from ").filter(|p| !p.is_empty()) {
        file.old_path = Some(from.to_string());
        file.status = FileStatus::Renamed;
    } else if let Some(to) = line.strip_prefix("rename to ").filter(|p| !p.is_empty()) {
        file.path = to.to_string();
    }
}

/// Parsed `@@ -a,b +c,d @@ context` line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HunkHeader<'a> {
    old_start: u64,
    old_count: u64,
    new_start: u64,
    new_count: u64,
    context: &'a str,
}

fn parse_hunk_header(line: &str) -> Option<HunkHeader<'_>> {
    let rest = line.strip_prefix("@@ -")?;
    let (old_start, old_count, rest) = parse_range(rest)?;
    let rest = rest.strip_prefix(" +")?;
    let (new_start, new_count, rest) = parse_range(rest)?;
    let context = rest.strip_prefix(" @@")?;

    Some(HunkHeader {
        old_start,
        old_count,
        new_start,
        new_count,
        context: context.trim(),
    })
}

/// Parse `start,count` or `start` (count defaults to 1), returning the remainder.
fn parse_range(s: &str) -> Option<(u64, u64, &str)> {
    let (start, rest) = take_number(s)?;
    match rest.strip_prefix(',') {
        Some(after_comma) => {
            let (count, rest) = take_number(after_comma)?;
            Some((start, count, rest))
        }
        None => Some((start, 1, rest)),
    }
}

fn take_number(s: &str) -> Option<(u64, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

/// Collect a hunk body starting at `lines[*i]`, counting into `file`.
///
/// Leaves `*i` on the first line that does not belong to the body.
fn collect_hunk(
    lines: &[&str],
    i: &mut usize,
    header: HunkHeader<'_>,
    file: &mut FileChange,
) -> Hunk {
    let mut content_lines = Vec::new();

    while *i < lines.len() {
        let current = lines[*i];

        if current.starts_with('+') && !current.starts_with("+++") {
            file.additions += 1;
            content_lines.push(current);
        } else if current.starts_with('-') && !current.starts_with("---") {
            file.deletions += 1;
            content_lines.push(current);
        } else if current.starts_with(' ') || current.is_empty() {
            content_lines.push(current);
        } else if current.starts_with(['+', '-', '\\']) {
            // "+++"/"---" lines and "\ No newline at end of file" stay in the hunk uncounted
        } else {
            break;
        }

        *i += 1;
    }

    log::trace!(
        "hunk -{},{} +{},{} in {}: {} line(s)",
        header.old_start,
        header.old_count,
        header.new_start,
        header.new_count,
        file.path,
        content_lines.len()
    );

    Hunk {
        old_start: header.old_start,
        old_count: header.old_count,
        new_start: header.new_start,
        new_count: header.new_count,
        context: header.context.to_string(),
        content: content_lines.join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_diff_returns_zero_analysis() {
        let analysis = parse_diff("");
        assert!(analysis.files.is_empty());
        assert_eq!(analysis.total_additions, 0);
        assert_eq!(analysis.total_deletions, 0);
        assert_eq!(analysis.total_files, 0);
        assert!(analysis.is_trivial);
    }

    #[test]
    fn parse_whitespace_only_returns_zero_analysis() {
        assert_eq!(parse_diff("  \n\t\n\n"), DiffAnalysis::default());
    }

    #[test]
    fn parse_single_file_single_hunk() {
        let diff = r#"diff --git a/file.txt b/file.txt
index 1234567..abcdefg 100644
--- a/file.txt
+++ b/file.txt
@@ -1,3 +1,3 @@ fn main()
 line1
-line2
+line2_modified
 line3"#;
        let analysis = parse_diff(diff);
        assert_eq!(analysis.total_files, 1);

        let file = &analysis.files[0];
        assert_eq!(file.path, "file.txt");
        assert_eq!(file.old_path, None);
        assert_eq!(file.status, FileStatus::Modified);
        assert_eq!(file.additions, 1);
        assert_eq!(file.deletions, 1);
        assert_eq!(file.hunks.len(), 1);

        let hunk = &file.hunks[0];
        assert_eq!(hunk.old_start, 1);
        assert_eq!(hunk.old_count, 3);
        assert_eq!(hunk.new_start, 1);
        assert_eq!(hunk.new_count, 3);
        assert_eq!(hunk.context, "fn main()");
        assert_eq!(hunk.content, " line1\n-line2\n+line2_modified\n line3");
    }

    #[test]
    fn trailing_newline_becomes_empty_context_line() {
        let diff = "diff --git a/a.txt b/a.txt\n@@ -1 +1 @@\n-old\n+new\n";
        let analysis = parse_diff(diff);
        assert_eq!(analysis.files[0].hunks[0].content, "-old\n+new\n");
    }

    #[test]
    fn parse_single_file_multiple_hunks() {
        let diff = r#"diff --git a/file.txt b/file.txt
--- a/file.txt
+++ b/file.txt
@@ -1,3 +1,3 @@
 line1
-line2
+line2_modified
 line3
@@ -10,2 +10,3 @@ section
 line10
+new_line
 line11
"#;
        let analysis = parse_diff(diff);
        let file = &analysis.files[0];
        assert_eq!(file.hunks.len(), 2);
        assert_eq!(file.additions, 2);
        assert_eq!(file.deletions, 1);
        assert_eq!(file.hunks[0].content, " line1\n-line2\n+line2_modified\n line3");
        assert_eq!(file.hunks[1].old_start, 10);
        assert_eq!(file.hunks[1].new_count, 3);
        assert_eq!(file.hunks[1].context, "section");
    }

    #[test]
    fn parse_multiple_files_keeps_counts_separate() {
        let diff = r#"diff --git a/file1.txt b/file1.txt
--- a/file1.txt
+++ b/file1.txt
@@ -1,2 +1,2 @@
-old
+new
+extra
diff --git a/file2.txt b/file2.txt
--- a/file2.txt
+++ b/file2.txt
@@ -1,2 +1,2 @@
-old2
-gone
+new2
"#;
        let analysis = parse_diff(diff);
        assert_eq!(analysis.total_files, 2);
        assert_eq!(analysis.files[0].path, "file1.txt");
        assert_eq!(analysis.files[0].additions, 2);
        assert_eq!(analysis.files[0].deletions, 1);
        assert_eq!(analysis.files[0].hunks.len(), 1);
        assert_eq!(analysis.files[1].path, "file2.txt");
        assert_eq!(analysis.files[1].additions, 1);
        assert_eq!(analysis.files[1].deletions, 2);
        assert_eq!(analysis.files[1].hunks.len(), 1);
        assert_eq!(analysis.total_additions, 3);
        assert_eq!(analysis.total_deletions, 3);
    }

    #[test]
    fn parse_new_file() {
        let diff = r#"diff --git a/x.py b/x.py
new file mode 100644
index 0000000..abcdefg
--- /dev/null
+++ b/x.py
@@ -0,0 +1,2 @@
+line1
+line2
"#;
        let analysis = parse_diff(diff);
        let file = &analysis.files[0];
        assert_eq!(file.path, "x.py");
        assert_eq!(file.status, FileStatus::Added);
        assert_eq!(file.additions, 2);
    }

    #[test]
    fn parse_deleted_file() {
        let diff = r#"diff --git a/deleted.txt b/deleted.txt
deleted file mode 100644
index abcdefg..0000000
--- a/deleted.txt
+++ /dev/null
@@ -1,2 +0,0 @@
-line1
-line2
"#;
        let analysis = parse_diff(diff);
        let file = &analysis.files[0];
        assert_eq!(file.path, "deleted.txt");
        assert_eq!(file.status, FileStatus::Deleted);
        assert_eq!(file.deletions, 2);
        assert_eq!(file.hunks[0].new_start, 0);
        assert_eq!(file.hunks[0].new_count, 0);
    }

    #[test]
    fn parse_rename() {
        let diff = r#"diff --git a/old.txt b/new.txt
similarity index 100%
rename from old.txt
rename to new.txt
"#;
        let analysis = parse_diff(diff);
        let file = &analysis.files[0];
        assert_eq!(file.status, FileStatus::Renamed);
        assert_eq!(file.old_path.as_deref(), Some("old.txt"));
        assert_eq!(file.path, "new.txt");
        assert!(file.hunks.is_empty());
    }

    #[test]
    fn last_status_line_wins() {
        let diff = "diff --git a/a.txt b/a.txt\nnew file mode 100644\ndeleted file mode 100644\n";
        assert_eq!(parse_diff(diff).files[0].status, FileStatus::Deleted);

        let diff = "diff --git a/a.txt b/b.txt\ndeleted file mode 100644\nrename from a.txt\nrename to b.txt\n";
        let file = &parse_diff(diff).files[0];
        assert_eq!(file.status, FileStatus::Renamed);
        assert_eq!(file.path, "b.txt");
    }

    #[test]
    fn identical_paths_start_modified_file() {
        let analysis = parse_diff("diff --git a/same.md b/same.md\n");
        assert_eq!(analysis.files[0].status, FileStatus::Modified);
        assert_eq!(analysis.files[0].path, "same.md");
    }

    #[test]
    fn file_header_splits_on_last_b_separator() {
        assert_eq!(parse_file_header("diff --git a/x b/y b/z"), Some("z"));
        assert_eq!(parse_file_header("diff --git a/src/lib.rs b/src/lib.rs"), Some("src/lib.rs"));
        assert_eq!(parse_file_header("diff --git a/x b/"), None);
        assert_eq!(parse_file_header("diff --git x y"), None);
    }

    #[test]
    fn hunk_header_edge_cases() {
        let header = parse_hunk_header("@@ -1,3 +1,4 @@ foo").unwrap();
        assert_eq!(
            header,
            HunkHeader {
                old_start: 1,
                old_count: 3,
                new_start: 1,
                new_count: 4,
                context: "foo",
            }
        );

        // Omitted counts default to 1
        let header = parse_hunk_header("@@ -5 +5 @@").unwrap();
        assert_eq!((header.old_count, header.new_count), (1, 1));
        assert_eq!(header.context, "");

        // Context directly after the marker is still trimmed
        assert_eq!(parse_hunk_header("@@ -1 +1 @@  impl Foo  ").unwrap().context, "impl Foo");

        assert!(parse_hunk_header("@@ -a,1 +1 @@").is_none());
        assert!(parse_hunk_header("@@ -1, +1 @@").is_none());
        assert!(parse_hunk_header("@@ -1 +1").is_none());
        assert!(parse_hunk_header("@@@ -1,1 -1,1 +1,2 @@@").is_none());
    }

    #[test]
    fn hunk_before_file_header_is_ignored() {
        let diff = "@@ -1 +1 @@\n-old\n+new\ndiff --git a/a.md b/a.md\n";
        let analysis = parse_diff(diff);
        assert_eq!(analysis.total_files, 1);
        assert_eq!(analysis.total_additions, 0);
        assert!(analysis.files[0].hunks.is_empty());
    }

    #[test]
    fn consecutive_hunk_headers_yield_empty_hunk() {
        let diff = "diff --git a/a.md b/a.md\n@@ -1 +1 @@\n@@ -4 +4 @@\n+x";
        let file = &parse_diff(diff).files[0];
        assert_eq!(file.hunks.len(), 2);
        assert_eq!(file.hunks[0].content, "");
        assert_eq!(file.hunks[1].content, "+x");
    }

    #[test]
    fn malformed_line_ends_hunk() {
        let diff = "diff --git a/a.md b/a.md\n@@ -1,2 +1,2 @@\n-old\ngarbage\n+lost\n";
        let file = &parse_diff(diff).files[0];
        assert_eq!(file.hunks.len(), 1);
        assert_eq!(file.hunks[0].content, "-old");
        assert_eq!(file.deletions, 1);
        assert_eq!(file.additions, 0);
    }

    #[test]
    fn terminating_line_is_reprocessed() {
        // The rename line ends the hunk body and is still applied to the file
        let diff = "diff --git a/a.md b/b.md\n@@ -1 +1 @@\n-old\nrename from a.md\n";
        let file = &parse_diff(diff).files[0];
        assert_eq!(file.status, FileStatus::Renamed);
        assert_eq!(file.hunks[0].content, "-old");
    }

    #[test]
    fn no_newline_marker_is_absorbed() {
        let diff = "diff --git a/a.md b/a.md\n@@ -1 +1 @@\n-old\n\\ No newline at end of file\n+new\n\\ No newline at end of file";
        let file = &parse_diff(diff).files[0];
        assert_eq!(file.hunks[0].content, "-old\n+new");
        assert_eq!(file.additions, 1);
        assert_eq!(file.deletions, 1);
    }

    #[test]
    fn triple_marker_lines_are_skipped_without_ending_hunk() {
        let diff = "diff --git a/a.md b/a.md\n@@ -1 +1 @@\n+++ b/a.md\n";
        let file = &parse_diff(diff).files[0];
        assert_eq!(file.additions, 0);
        assert_eq!(file.hunks.len(), 1);
        assert_eq!(file.hunks[0].content, "");
    }

    #[test]
    fn deleted_sql_comment_keeps_hunk_open() {
        // Removing "-- note" yields "--- note", which is neither counted nor a terminator
        let diff = "diff --git a/q.sql b/q.sql\n@@ -1,3 +1,2 @@\n-- old note\n--- old note\n-SELECT 1;\n+SELECT 2;\n+++i;\n+SELECT 3;";
        let file = &parse_diff(diff).files[0];
        assert_eq!(file.hunks.len(), 1);
        assert_eq!((file.additions, file.deletions), (2, 2));
        assert_eq!(
            file.hunks[0].content,
            "-- old note\n-SELECT 1;\n+SELECT 2;\n+SELECT 3;"
        );
    }

    #[test]
    fn large_hunk_ranges_are_accepted() {
        let diff = "diff --git a/big.log b/big.log\n@@ -4294967296,2 +4294967297 @@\n-a\n+b";
        let file = &parse_diff(diff).files[0];
        assert_eq!(file.hunks.len(), 1);
        assert_eq!(file.hunks[0].old_start, 4_294_967_296);
        assert_eq!(file.hunks[0].new_start, 4_294_967_297);
        assert_eq!(file.hunks[0].new_count, 1);
        assert_eq!((file.additions, file.deletions), (1, 1));
    }

    #[test]
    fn rejected_hunk_header_leaves_body_unattributed() {
        // Beyond u64 the header does not match, so no hunk is opened
        let diff = "diff --git a/a.md b/a.md\n@@ -99999999999999999999 +1 @@\n-a\n+b";
        let file = &parse_diff(diff).files[0];
        assert!(file.hunks.is_empty());
        assert_eq!((file.additions, file.deletions), (0, 0));
    }

    #[test]
    fn triviality_depends_on_extension_and_size() {
        let markdown = "diff --git a/README.md b/README.md\n@@ -1,2 +1,3 @@\n+a\n+b\n+c\n-d\n-e\n";
        let analysis = parse_diff(markdown);
        assert_eq!(analysis.total_additions + analysis.total_deletions, 5);
        assert!(analysis.is_trivial);

        let python = markdown.replace("README.md", "app.py");
        assert!(!parse_diff(&python).is_trivial);

        let big: String = std::iter::once("diff --git a/notes.txt b/notes.txt\n@@ -0,0 +1,10 @@\n".to_string())
            .chain((0..10).map(|n| format!("+line {n}\n")))
            .collect();
        assert!(!parse_diff(&big).is_trivial);
    }

    #[test]
    fn custom_policy_is_applied() {
        let diff = "diff --git a/a.md b/a.md\n@@ -1 +1 @@\n-old\n+new\n";
        let policy = TrivialityPolicy {
            max_changed_lines: 2,
            code_extensions: vec![".md".to_string()],
        };
        assert!(!parse_diff_with(diff, &policy).is_trivial);

        let policy = TrivialityPolicy {
            max_changed_lines: 3,
            code_extensions: Vec::new(),
        };
        assert!(parse_diff_with(diff, &policy).is_trivial);
    }

    #[test]
    fn totals_match_per_file_sums() {
        let diff = r#"diff --git a/a.rs b/a.rs
@@ -1,2 +1,3 @@
 keep
+one
+two
diff --git a/b.rs b/b.rs
deleted file mode 100644
@@ -1,3 +0,0 @@
-x
-y
-z
"#;
        let analysis = parse_diff(diff);
        let adds: usize = analysis.files.iter().map(|f| f.additions).sum();
        let dels: usize = analysis.files.iter().map(|f| f.deletions).sum();
        assert_eq!(analysis.total_additions, adds);
        assert_eq!(analysis.total_deletions, dels);
        assert_eq!(analysis.total_files, analysis.files.len());
    }

    #[test]
    fn parsing_is_deterministic() {
        let diff = "diff --git a/a.txt b/a.txt\n@@ -1 +1 @@ ctx\n-old\n+new\n";
        assert_eq!(parse_diff(diff), parse_diff(diff));
    }
}
