//! CLI output formatting for the build and check commands.
//!
//! # Information-First Display
//!
//! Posts are listed by their identity (positional index, title, date) with
//! the source file and URL as indented context lines. Untitled posts fall
//! back to their file name in parentheses, so every line names something the
//! author can find.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Posts
//! 001 Hello world (4 Apr 2020)
//!     Source: posts/hello.md
//!     URL: /programming/2020/04/04/hello.html
//! 002 (notes.md) (9 May 2020)
//!     Source: posts/notes.md
//!     URL: /life/2020/05/09/notes.html
//!
//! Categories
//! Life (1 page)
//!     001 (notes.md)
//! Programming (1 page)
//!     001 Hello world
//!
//! Tags
//! rust (1 page)
//!     001 Hello world
//!
//! Found 2 posts, 2 categories, 1 tag
//! ```
//!
//! ## Build
//!
//! ```text
//! Built
//! 001 index.html
//! 002 programming/2020/04/04/hello.html
//!
//! 2 built, 10 up to date (12 total)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::aggregate::SiteInfo;
use crate::generate::BuildReport;
use crate::page::PageSummary;
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 post`, `2 posts`.
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// Title if the page has one, otherwise its file name in parentheses.
///
/// ```text
/// 001 Hello world      // titled
/// 001 (notes.md)       // untitled
/// ```
fn page_line(index: usize, page: &PageSummary) -> String {
    match page.metadata.title() {
        Some(title) if !title.is_empty() => format!("{} {}", format_index(index), title),
        _ => {
            let name = page
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("{} ({})", format_index(index), name)
        }
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the site index: posts in order, then category and tag buckets.
pub fn format_check_output(site: &SiteInfo) -> Vec<String> {
    let mut lines = Vec::new();

    if !site.posts.is_empty() {
        lines.push("Posts".to_string());
        for (i, post) in site.posts.iter().enumerate() {
            let mut header = page_line(i + 1, post);
            if let Some(date) = &post.metadata.human_readable_date {
                header.push_str(&format!(" ({date})"));
            }
            lines.push(header);
            lines.push(format!("{}Source: {}", indent(1), post.path.display()));
            lines.push(format!("{}URL: {}", indent(1), post.url));
        }
        lines.push(String::new());
    }

    format_buckets(&mut lines, "Categories", &site.categories);
    format_buckets(&mut lines, "Tags", &site.tags);

    lines.push(format!(
        "Found {}, {}, {}",
        count(site.posts.len(), "post", "posts"),
        count(site.categories.len(), "category", "categories"),
        count(site.tags.len(), "tag", "tags"),
    ));
    lines
}

fn format_buckets(
    lines: &mut Vec<String>,
    heading: &str,
    buckets: &BTreeMap<String, Vec<PageSummary>>,
) {
    if buckets.is_empty() {
        return;
    }
    lines.push(heading.to_string());
    for (name, pages) in buckets {
        lines.push(format!("{} ({})", name, count(pages.len(), "page", "pages")));
        for (i, page) in pages.iter().enumerate() {
            lines.push(format!("{}{}", indent(1), page_line(i + 1, page)));
        }
    }
    lines.push(String::new());
}

/// Print check output to stdout.
pub fn print_check_output(site: &SiteInfo) {
    for line in format_check_output(site) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format a build report; written paths are shown relative to `build_dir`.
pub fn format_build_output(report: &BuildReport, build_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if report.built.is_empty() {
        lines.push("Nothing to build".to_string());
    } else {
        lines.push("Built".to_string());
        for (i, dest) in report.built.iter().enumerate() {
            let shown = dest.strip_prefix(build_dir).unwrap_or(dest);
            lines.push(format!("{} {}", format_index(i + 1), shown.display()));
        }
    }

    lines.push(String::new());
    lines.push(report.stats.to_string());
    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport, build_dir: &Path) {
    for line in format_build_output(report, build_dir) {
        println!("{}", line);
    }
}
