//! # Quill
//!
//! A small static site generator for blogs. Markdown and HTML pages are
//! rendered through Jinja-style templates, posts are dated, categorised and
//! linked to their neighbours, and only files whose source changed are
//! rebuilt.
//!
//! # Architecture: Load, Then Build
//!
//! ```text
//! 1. Scan       site/    →  content tree   (pages parsed, assets noted)
//! 2. Aggregate  tree     →  site index     (post order, URLs, categories, tags)
//! 3. Build      tree     →  build/         (stale pages rendered, stale assets copied)
//! ```
//!
//! Each phase finishes before the next begins. Scanning parses every page's
//! front matter up front, so a malformed page fails the run before anything
//! is written; aggregation sees the whole site, so every page renders against
//! a complete index.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`frontmatter`] | Splits the leading `---` YAML block off a document |
//! | [`metadata`] | Typed front matter: date coercion, publish flag, category, tags |
//! | [`markdown`] | Markdown → HTML, wrapped to extend a base template |
//! | [`page`] | Pages and assets: URLs, destinations, file kinds |
//! | [`tree`] | The content tree and its visitor |
//! | [`scan`] | Walks the site root into a content tree |
//! | [`aggregate`] | Orders and links posts, indexes categories and tags |
//! | [`staleness`] | Per-file rebuild decisions and build statistics |
//! | [`generate`] | Runs the pipeline: renders pages, copies assets |
//! | [`config`] | Build layout and the optional `config.yaml` site document |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Parse Once, Statelessly
//!
//! Front matter is extracted by a pure function of the document text. No
//! parser instance carries state from one page to the next, so the order
//! pages are loaded in cannot leak metadata between them.
//!
//! ## Deterministic Order
//!
//! Directory entries are walked in file-name order and stored in sorted maps.
//! Posts with the same date therefore always come out in the same order, on
//! every platform.
//!
//! ## Snapshots, Not References
//!
//! `previous`/`next` links and the category, tag and post indexes hold
//! [`page::PageSummary`] snapshots taken after URLs are final. The content
//! tree stays the only owner of pages.

pub mod aggregate;
pub mod config;
pub mod frontmatter;
pub mod generate;
pub mod markdown;
pub mod metadata;
pub mod output;
pub mod page;
pub mod scan;
pub mod staleness;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_helpers;
