//! Shared test utilities for the quill test suite.
//!
//! Builds content trees in memory or on disk, and looks pages up by path
//! with a clear message on miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut tree = tree_of(&[
//!     ("posts/a.md", post("First", "2020-01-01", "Programming", &["rust"])),
//!     ("index.html", "<p>home</p>".to_string()),
//! ]);
//!
//! let page = find_page(&tree, "posts/a.md");
//! assert_eq!(page.metadata.title(), Some("First"));
//! ```

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

use crate::page::{Asset, FileKind, Page};
use crate::tree::{ContentTree, FileNode};

// =========================================================================
// Fixture setup
// =========================================================================

/// Markdown post with the usual front matter fields set.
pub fn post(title: &str, date: &str, category: &str, tags: &[&str]) -> String {
    let mut text = format!("---\ntitle: {title}\ndate: {date}\ncategory: {category}\n");
    if !tags.is_empty() {
        text.push_str(&format!("tags: [{}]\n", tags.join(", ")));
    }
    text.push_str(&format!("---\nBody of {title}.\n"));
    text
}

/// Content tree built from `(relative path, file text)` pairs without
/// touching the filesystem.
pub fn tree_of(files: &[(&str, String)]) -> ContentTree {
    let mut tree = ContentTree::new();
    for (path, text) in files {
        let path = Path::new(path);
        let file = match FileKind::of(path) {
            FileKind::Page => FileNode::Page(
                Page::from_source(path, path.to_path_buf(), text)
                    .unwrap_or_else(|e| panic!("fixture {}: {e}", path.display())),
            ),
            FileKind::Asset => FileNode::Asset(Asset::new(Path::new(""), path)),
        };
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        tree.insert(&parent_dirs(path), &name, file)
            .unwrap_or_else(|e| panic!("fixture {}: {e}", path.display()));
    }
    tree
}

fn parent_dirs(path: &Path) -> Vec<String> {
    path.parent()
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// Write `(relative path, contents)` pairs into a fresh temp directory.
pub fn write_site(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (path, contents) in files {
        let full = tmp.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(&full, contents).unwrap();
    }
    tmp
}

/// Set a file's modification time.
pub fn set_mtime(path: &Path, modified: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(modified)
        .unwrap();
}

// =========================================================================
// Tree lookups: panics with a clear message on miss
// =========================================================================

/// Find a page by its path relative to the site root. Panics if not found.
pub fn find_page<'a>(tree: &'a ContentTree, path: &str) -> &'a Page {
    tree.pages()
        .into_iter()
        .find(|p| p.path == Path::new(path))
        .unwrap_or_else(|| {
            let paths = page_paths(tree);
            panic!("page '{path}' not found. Available: {paths:?}")
        })
}

/// All page paths in traversal order.
pub fn page_paths(tree: &ContentTree) -> Vec<PathBuf> {
    tree.pages().iter().map(|p| p.path.clone()).collect()
}
