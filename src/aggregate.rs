//! Site-wide aggregation: posts, categories and tags.
//!
//! Runs once per build, after discovery and before any page renders:
//!
//! 1. Collect published pages under the posts directory (recursively).
//! 2. Sort them by `date`, oldest first. Equal dates keep discovery order,
//!    which is name order (see [`tree`](crate::tree)).
//! 3. Give each post its canonical URL:
//!    `/<category, lowercased>/<year>/<MM>/<DD>/<output file name>`.
//! 4. Link each post to its neighbours through `previous` / `next`.
//! 5. Index every published page in the tree, post or not, by category and
//!    by tag, then sort each bucket by date. Pages outside the posts
//!    directory need no date; undated pages sort before every dated one and
//!    keep name order among themselves.
//!
//! The index stores [`PageSummary`] snapshots taken after step 3, so every
//! cross-reference sees final URLs and the tree keeps sole ownership of its
//! pages.
//!
//! A post without a date cannot be ordered and a post without a category
//! has no canonical URL; both abort the build.

use crate::page::{Page, PageSummary};
use crate::tree::ContentTree;
use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use serde_yaml_ng::Mapping;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("{0}: post has no date; posts are ordered by their 'date' field")]
    MissingDate(PathBuf),
    #[error("{0}: post has no category; post URLs start with the category")]
    MissingCategory(PathBuf),
}

/// Everything templates see as `site`.
///
/// Keys from `config.yaml` are flattened alongside the indexes, so
/// `title: My Blog` in the config is `{{ site.title }}` in a template.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SiteInfo {
    #[serde(flatten)]
    pub config: Mapping,
    pub categories: BTreeMap<String, Vec<PageSummary>>,
    pub tags: BTreeMap<String, Vec<PageSummary>>,
    pub posts: Vec<PageSummary>,
}

impl SiteInfo {
    /// Empty indexes seeded with the site configuration.
    pub fn new(config: Mapping) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }
}

/// Populate `site` from `tree`, assigning URLs and links to posts.
pub fn aggregate(
    tree: &mut ContentTree,
    posts_dir: &str,
    site: &mut SiteInfo,
) -> Result<(), AggregateError> {
    site.posts = match tree.directory_mut(posts_dir) {
        Some(dir) => link_posts(dir.pages_mut())?,
        None => {
            debug!(posts_dir, "no posts directory");
            Vec::new()
        }
    };

    index_pages(&tree.pages(), site);

    info!(
        posts = site.posts.len(),
        categories = site.categories.len(),
        tags = site.tags.len(),
        "aggregated site"
    );
    Ok(())
}

/// Order, address and link the published posts; returns them oldest first.
fn link_posts(pages: Vec<&mut Page>) -> Result<Vec<PageSummary>, AggregateError> {
    let mut posts: Vec<&mut Page> = pages.into_iter().filter(|p| p.is_published()).collect();

    if let Some(undated) = posts.iter().find(|p| p.metadata.date.is_none()) {
        return Err(AggregateError::MissingDate(undated.path.clone()));
    }
    posts.sort_by_key(|p| p.metadata.date);

    for post in posts.iter_mut() {
        let (Some(date), Some(category)) = (post.metadata.date, post.metadata.category.as_deref())
        else {
            return Err(AggregateError::MissingCategory(post.path.clone()));
        };
        post.url = canonical_url(category, &date, &post.output_name());
    }

    let summaries: Vec<PageSummary> = posts.iter().map(|p| p.summary()).collect();
    for (i, post) in posts.iter_mut().enumerate() {
        post.metadata.previous = i
            .checked_sub(1)
            .map(|prev| Box::new(summaries[prev].clone()));
        post.metadata.next = summaries.get(i + 1).cloned().map(Box::new);
    }

    Ok(summaries)
}

/// `/programming/2020/04/04/post.html`
pub fn canonical_url(category: &str, date: &NaiveDateTime, output_name: &str) -> String {
    format!(
        "/{}/{}/{:02}/{:02}/{}",
        category.to_lowercase(),
        date.year(),
        date.month(),
        date.day(),
        output_name
    )
}

/// Bucket published pages by category and tag, each bucket oldest first.
fn index_pages(pages: &[&Page], site: &mut SiteInfo) {
    for page in pages.iter().filter(|p| p.is_published()) {
        if let Some(category) = &page.metadata.category {
            site.categories
                .entry(category.clone())
                .or_default()
                .push(page.summary());
        }
        for tag in &page.metadata.tags {
            site.tags.entry(tag.clone()).or_default().push(page.summary());
        }
    }

    for bucket in site.categories.values_mut().chain(site.tags.values_mut()) {
        bucket.sort_by_key(|p| p.metadata.date);
    }
}
