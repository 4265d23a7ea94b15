//! Content files: pages and assets.
//!
//! A file's kind is fixed at discovery from its extension:
//!
//! - `.md` → [`Page`], front matter extracted, body converted and wrapped
//! - `.html` → [`Page`], raw template source, no front matter
//! - anything else → [`Asset`], copied byte-for-byte
//!
//! Pages are loaded eagerly: reading, front matter parsing and metadata
//! validation all happen in [`Page::load`], so a broken page fails discovery
//! rather than the render.
//!
//! ## URLs and destinations
//!
//! ```text
//! source                 url                         destination
//! about.md               /about.html                 build/about.html
//! blog/index.html        /blog/index.html            build/blog/index.html
//! css/site.css           /css/site.css               build/css/site.css
//! posts/hello.md (post)  /rust/2020/04/04/hello.html build/rust/2020/04/04/hello.html
//! ```
//!
//! A page's destination always follows its URL (with the extension forced to
//! `.html`), so `url:` overrides and canonical post URLs move the output file
//! too.

use crate::frontmatter::{self, FrontMatterError};
use crate::markdown;
use crate::metadata::{Metadata, MetadataError};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

const PAGE_EXTENSIONS: &[&str] = &["md", "html"];
const OUTPUT_EXTENSION: &str = "html";

#[derive(Error, Debug)]
pub enum PageError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: FrontMatterError,
    },
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Static content-type of a discovered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Page,
    Asset,
}

impl FileKind {
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if PAGE_EXTENSIONS.contains(&ext) => FileKind::Page,
            _ => FileKind::Asset,
        }
    }
}

/// A content page.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Path relative to the site root, e.g. `posts/hello.md`.
    pub path: PathBuf,
    /// Path the file is read from (site root joined with `path`).
    #[serde(skip)]
    pub source: PathBuf,
    /// Text after the last `.` of the file name (`md`, `html`).
    pub file_type: String,
    pub url: String,
    pub metadata: Metadata,
    /// Converted HTML for markdown pages, raw source for HTML pages.
    #[serde(skip)]
    pub body: String,
    /// Template source handed to the renderer.
    #[serde(skip)]
    pub template: String,
}

impl Page {
    /// Read and parse the page at `root/path`.
    pub fn load(root: &Path, path: &Path) -> Result<Self, PageError> {
        let source = root.join(path);
        let text = fs::read_to_string(&source).map_err(|source| PageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(path, source, &text)
    }

    /// Build a page from already-read text.
    pub fn from_source(path: &Path, source: PathBuf, text: &str) -> Result<Self, PageError> {
        let file_type = file_type(path);

        let (metadata, body, template) = if file_type == "md" {
            let (markdown_body, raw) =
                frontmatter::split(text).map_err(|source| PageError::FrontMatter {
                    path: path.to_path_buf(),
                    source,
                })?;
            let metadata = Metadata::from_mapping(path, raw)?;
            let body = markdown::to_html(&markdown_body);
            let template = markdown::wrap_in_base(&body, metadata.base_template());
            (metadata, body, template)
        } else {
            (Metadata::default(), text.to_string(), text.to_string())
        };

        let url = metadata
            .url
            .clone()
            .unwrap_or_else(|| url_for(&path.with_extension(OUTPUT_EXTENSION)));

        Ok(Self {
            path: path.to_path_buf(),
            source,
            file_type,
            url,
            metadata,
            body,
            template,
        })
    }

    /// Published unless front matter says `publish: false`.
    pub fn is_published(&self) -> bool {
        self.metadata.publish
    }

    /// Where the rendered page is written.
    pub fn dest(&self, build_dir: &Path) -> PathBuf {
        build_dir
            .join(self.url.trim_start_matches('/'))
            .with_extension(OUTPUT_EXTENSION)
    }

    /// File name of the rendered output, e.g. `hello.html`.
    pub fn output_name(&self) -> String {
        Path::new(&self.url)
            .with_extension(OUTPUT_EXTENSION)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Snapshot of this page for cross-references (no `previous`/`next`).
    pub fn summary(&self) -> PageSummary {
        let mut metadata = self.metadata.clone();
        metadata.previous = None;
        metadata.next = None;
        PageSummary {
            path: self.path.clone(),
            url: self.url.clone(),
            metadata,
        }
    }
}

/// A page as seen from another page or from the site index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    pub path: PathBuf,
    pub url: String,
    pub metadata: Metadata,
}

/// A non-content file, copied unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    pub path: PathBuf,
    #[serde(skip)]
    pub source: PathBuf,
    pub file_type: String,
    pub url: String,
}

impl Asset {
    pub fn new(root: &Path, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            source: root.join(path),
            file_type: file_type(path),
            url: url_for(path),
        }
    }

    pub fn dest(&self, build_dir: &Path) -> PathBuf {
        build_dir.join(&self.path)
    }
}

/// Text after the last `.` of the file name; the whole name if there is none.
fn file_type(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_string(),
        None => name,
    }
}

/// `/`-separated absolute URL for a relative path, regardless of platform.
fn url_for(path: &Path) -> String {
    let mut url = String::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            url.push('/');
            url.push_str(&part.to_string_lossy());
        }
    }
    url
}
