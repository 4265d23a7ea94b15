//! The content tree: directories and files discovered under the site root.
//!
//! Directories map entry names to child nodes; files are pages or assets.
//! Entries are kept in a [`BTreeMap`], so every traversal visits files in
//! the same order (sorted by name, depth-first) on every platform.
//!
//! ```text
//! Directory
//! ├── "index.html" → File(Page)
//! ├── "css"        → Directory
//! │   └── "site.css" → File(Asset)
//! └── "posts"      → Directory
//!     ├── "a.md"   → File(Page)
//!     └── "b.md"   → File(Page)
//! ```

use crate::page::{Asset, Page};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("'{0}' is both a file and a directory")]
    PathConflict(PathBuf),
}

#[derive(Debug)]
pub enum Node {
    Directory(Directory),
    File(FileNode),
}

#[derive(Debug)]
pub enum FileNode {
    Page(Page),
    Asset(Asset),
}

impl FileNode {
    pub fn path(&self) -> &Path {
        match self {
            FileNode::Page(page) => &page.path,
            FileNode::Asset(asset) => &asset.path,
        }
    }
}

/// Operations run over every file in a tree.
///
/// Both methods default to doing nothing, so a visitor only implements what
/// it cares about.
pub trait Visitor {
    type Error;

    fn visit_page(&mut self, _page: &Page) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_asset(&mut self, _asset: &Asset) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Directory {
    pub entries: BTreeMap<String, Node>,
}

impl Directory {
    /// Depth-first walk; stops at the first error.
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
        for node in self.entries.values() {
            match node {
                Node::Directory(dir) => dir.accept(visitor)?,
                Node::File(FileNode::Page(page)) => visitor.visit_page(page)?,
                Node::File(FileNode::Asset(asset)) => visitor.visit_asset(asset)?,
            }
        }
        Ok(())
    }

    /// Every page at or below this directory.
    pub fn pages(&self) -> Vec<&Page> {
        let mut pages = Vec::new();
        self.collect_pages(&mut pages);
        pages
    }

    fn collect_pages<'a>(&'a self, pages: &mut Vec<&'a Page>) {
        for node in self.entries.values() {
            match node {
                Node::Directory(dir) => dir.collect_pages(pages),
                Node::File(FileNode::Page(page)) => pages.push(page),
                Node::File(FileNode::Asset(_)) => {}
            }
        }
    }

    /// Every page at or below this directory, mutably.
    pub fn pages_mut(&mut self) -> Vec<&mut Page> {
        let mut pages = Vec::new();
        self.collect_pages_mut(&mut pages);
        pages
    }

    fn collect_pages_mut<'a>(&'a mut self, pages: &mut Vec<&'a mut Page>) {
        for node in self.entries.values_mut() {
            match node {
                Node::Directory(dir) => dir.collect_pages_mut(pages),
                Node::File(FileNode::Page(page)) => pages.push(page),
                Node::File(FileNode::Asset(_)) => {}
            }
        }
    }

    pub fn file_count(&self) -> usize {
        self.entries
            .values()
            .map(|node| match node {
                Node::Directory(dir) => dir.file_count(),
                Node::File(_) => 1,
            })
            .sum()
    }
}

/// Root of the content tree.
#[derive(Debug, Default)]
pub struct ContentTree {
    pub root: Directory,
}

impl ContentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file under the directory named by `dirs`, creating
    /// intermediate directories. An existing file with the same name is kept.
    ///
    /// Returns the file now stored at that position, or an error when a
    /// file already occupies a directory's place (or the reverse).
    pub fn insert(
        &mut self,
        dirs: &[String],
        name: &str,
        file: FileNode,
    ) -> Result<&FileNode, TreeError> {
        let mut level = &mut self.root;
        let mut at = PathBuf::new();
        for part in dirs {
            at.push(part);
            let node = level
                .entries
                .entry(part.clone())
                .or_insert_with(|| Node::Directory(Directory::default()));
            level = match node {
                Node::Directory(dir) => dir,
                Node::File(_) => return Err(TreeError::PathConflict(at)),
            };
        }

        at.push(name);
        match level
            .entries
            .entry(name.to_string())
            .or_insert(Node::File(file))
        {
            Node::File(file) => Ok(file),
            Node::Directory(_) => Err(TreeError::PathConflict(at)),
        }
    }

    /// Top-level directory by name.
    pub fn directory(&self, name: &str) -> Option<&Directory> {
        match self.root.entries.get(name) {
            Some(Node::Directory(dir)) => Some(dir),
            _ => None,
        }
    }

    pub fn directory_mut(&mut self, name: &str) -> Option<&mut Directory> {
        match self.root.entries.get_mut(name) {
            Some(Node::Directory(dir)) => Some(dir),
            _ => None,
        }
    }

    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
        self.root.accept(visitor)
    }

    pub fn pages(&self) -> Vec<&Page> {
        self.root.pages()
    }

    pub fn file_count(&self) -> usize {
        self.root.file_count()
    }

    pub fn page_count(&self) -> usize {
        self.root.pages().len()
    }
}
