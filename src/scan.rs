//! Content discovery.
//!
//! Walks the site root and builds the [`ContentTree`] every later stage
//! works on. Pages are loaded (and their front matter parsed) as they are
//! found.
//!
//! ## Layout
//!
//! ```text
//! site/                    # Site root
//! ├── config.yaml          # Site configuration (never content)
//! ├── index.html           # Page
//! ├── about.md             # Page
//! ├── css/site.css         # Asset
//! ├── posts/               # Posts: dated, categorised, linked
//! │   └── hello.md
//! ├── templates/           # Ignored: layouts
//! ├── build/               # Ignored: output
//! ├── _drafts/             # Ignored: leading '_'
//! └── .git/                # Ignored: leading '.'
//! ```
//!
//! ## Exclusions
//!
//! - a **top-level** directory named in [`ScanOptions::ignore_dirs`]
//! - any directory or file whose name starts with `.` or `_`, at any depth
//! - the configuration file, at the root only
//!
//! Entries are walked in file-name order, so the tree (and everything that
//! inherits its order) is the same on every platform.

use crate::page::{Asset, FileKind, Page, PageError};
use crate::tree::{ContentTree, FileNode, TreeError};
use std::path::{Component, Path};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// What discovery leaves out.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Top-level directory names that are never content.
    pub ignore_dirs: Vec<String>,
    /// Name of the configuration file at the site root.
    pub config_file: String,
}

impl ScanOptions {
    fn is_excluded(&self, relative: &Path, is_dir: bool) -> bool {
        let mut components = relative.components().peekable();
        let mut top_level = true;
        while let Some(component) = components.next() {
            let Component::Normal(part) = component else {
                continue;
            };
            let part = part.to_string_lossy();
            if part.starts_with('.') || part.starts_with('_') {
                return true;
            }
            let is_last = components.peek().is_none();
            if top_level {
                if (is_dir || !is_last) && self.ignore_dirs.iter().any(|d| *d == part) {
                    return true;
                }
                if is_last && !is_dir && part == self.config_file.as_str() {
                    return true;
                }
            }
            top_level = false;
        }
        false
    }
}

/// Discover all content under `root`.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ContentTree, ScanError> {
    let mut tree = ContentTree::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !excluded(root, options, entry));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        let file = match FileKind::of(relative) {
            FileKind::Page => FileNode::Page(Page::load(root, relative)?),
            FileKind::Asset => FileNode::Asset(Asset::new(root, relative)),
        };
        debug!(path = %relative.display(), kind = ?FileKind::of(relative), "discovered");

        let dirs: Vec<String> = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        let name = entry.file_name().to_string_lossy();
        tree.insert(&dirs, &name, file)?;
    }

    info!(
        files = tree.file_count(),
        pages = tree.page_count(),
        "scanned {}",
        root.display()
    );
    Ok(tree)
}

fn excluded(root: &Path, options: &ScanOptions, entry: &DirEntry) -> bool {
    match entry.path().strip_prefix(root) {
        Ok(relative) => options.is_excluded(relative, entry.file_type().is_dir()),
        Err(_) => false,
    }
}
