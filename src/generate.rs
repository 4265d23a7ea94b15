//! Site generation.
//!
//! The build pipeline, in order:
//!
//! 1. **Load**: read `config.yaml`, discover content ([`scan`]) and run the
//!    site-wide pass ([`aggregate`]). Nothing is written.
//! 2. **Build**: walk the content tree; for every file, decide whether it
//!    is stale ([`staleness`]) and, if so, render the page or copy the asset
//!    to its destination under the build directory.
//!
//! Each phase completes before the next starts, so every page renders against
//! the finished `site` index.
//!
//! ## Rendering
//!
//! Templates are loaded with [Tera](https://keats.github.io/tera/) from the
//! templates directory. A page's template source (the raw HTML of an `.html`
//! page, or the wrapped conversion of a `.md` page) is rendered once, with:
//!
//! | Variable | Value |
//! |----------|-------|
//! | `site` | `config.yaml` keys plus `posts`, `categories`, `tags` |
//! | `page` | `path`, `url`, `file_type`, `metadata` |
//! | `post_content` | the page body (converted HTML for markdown) |
//!
//! Autoescaping is off: bodies are HTML already.
//!
//! ## Output Structure
//!
//! ```text
//! build/
//! ├── index.html                     # index.html
//! ├── about.html                     # about.md
//! ├── css/site.css                   # copied
//! └── programming/2020/04/04/
//!     └── hello.html                 # posts/hello.md (category: Programming)
//! ```
//!
//! [`scan`]: crate::scan
//! [`aggregate`]: crate::aggregate
//! [`staleness`]: crate::staleness

use crate::aggregate::{self, AggregateError, SiteInfo};
use crate::config::{self, BuildConfig, ConfigError};
use crate::page::{Asset, Page};
use crate::scan::{self, ScanError};
use crate::staleness::{BuildStats, Decision, Force};
use crate::tree::{ContentTree, Visitor};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error("cannot load templates from {dir}: {}", error_chain(.source))]
    Templates { dir: PathBuf, source: tera::Error },
    #[error("cannot render {path}: {}", error_chain(.source))]
    Render { path: PathBuf, source: tera::Error },
}

/// Tera reports the useful part (which variable, which line) in the
/// source chain rather than the top-level message.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> GenerateError + '_ {
    move |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Discovered and aggregated site, ready to build.
#[derive(Debug)]
pub struct Site {
    pub tree: ContentTree,
    pub info: SiteInfo,
}

/// Load phase: configuration, discovery and aggregation.
pub fn load_site(root: &Path, config: &BuildConfig) -> Result<Site, GenerateError> {
    config.validate()?;
    let site_config = config::load_site_config(root, &config.config_file)?;
    let mut tree = scan::scan(root, &config.scan_options())?;
    let mut info = SiteInfo::new(site_config);
    aggregate::aggregate(&mut tree, &config.posts_dir, &mut info)?;
    Ok(Site { tree, info })
}

/// Load every template under `dir`.
///
/// A missing directory gives an empty set: `.html` pages that extend
/// nothing still render.
pub fn load_templates(dir: &Path) -> Result<Tera, GenerateError> {
    let mut tera = if dir.is_dir() {
        let glob = format!("{}/**/*", dir.display());
        Tera::new(&glob).map_err(|source| GenerateError::Templates {
            dir: dir.to_path_buf(),
            source,
        })?
    } else {
        warn!(dir = %dir.display(), "templates directory not found");
        Tera::default()
    };
    tera.autoescape_on(vec![]);
    debug!(templates = tera.get_template_names().count(), "loaded templates");
    Ok(tera)
}

#[derive(Serialize)]
struct RenderContext<'a> {
    site: &'a SiteInfo,
    page: &'a Page,
    post_content: &'a str,
}

/// Render a page's template source against the site.
pub fn render_page(tera: &mut Tera, site: &SiteInfo, page: &Page) -> Result<String, GenerateError> {
    let render_error = |source| GenerateError::Render {
        path: page.path.clone(),
        source,
    };
    let context = Context::from_serialize(RenderContext {
        site,
        page,
        post_content: &page.body,
    })
    .map_err(render_error)?;
    tera.render_str(&page.template, &context)
        .map_err(render_error)
}

/// What a build did.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Destinations written, in build order.
    pub built: Vec<PathBuf>,
    pub stats: BuildStats,
}

/// Full build: load, then render and copy everything that is stale.
pub fn build_site(
    root: &Path,
    config: &BuildConfig,
    force: &Force,
) -> Result<BuildReport, GenerateError> {
    let site = load_site(root, config)?;
    let tera = load_templates(&config.templates_path(root))?;
    build(&site, tera, &config.build_path(root), force)
}

/// Build phase over an already-loaded site.
pub fn build(
    site: &Site,
    tera: Tera,
    build_dir: &Path,
    force: &Force,
) -> Result<BuildReport, GenerateError> {
    let mut builder = Builder {
        tera,
        site: &site.info,
        build_dir,
        force,
        report: BuildReport::default(),
    };
    site.tree.accept(&mut builder)?;

    let report = builder.report;
    info!(stats = %report.stats, "build finished");
    Ok(report)
}

struct Builder<'a> {
    tera: Tera,
    site: &'a SiteInfo,
    build_dir: &'a Path,
    force: &'a Force,
    report: BuildReport,
}

impl Builder<'_> {
    /// Staleness check for one file; records the decision.
    fn decide(&mut self, source: &Path, dest: &Path) -> Result<Decision, GenerateError> {
        let decision = self
            .force
            .evaluate(source, dest)
            .map_err(io_error(source))?;
        self.report.stats.record(decision);
        Ok(decision)
    }
}

impl Visitor for Builder<'_> {
    type Error = GenerateError;

    fn visit_page(&mut self, page: &Page) -> Result<(), GenerateError> {
        if !page.is_published() {
            debug!(path = %page.path.display(), "unpublished, skipping");
            self.report.stats.unpublished();
            return Ok(());
        }

        let dest = page.dest(self.build_dir);
        let decision = self.decide(&page.source, &dest)?;
        if !decision.needs_build() {
            debug!(path = %page.path.display(), "up to date");
            return Ok(());
        }

        info!(path = %page.path.display(), ?decision, "building");
        let html = render_page(&mut self.tera, self.site, page)?;
        write_output(&dest, html.as_bytes())?;
        self.report.built.push(dest);
        Ok(())
    }

    fn visit_asset(&mut self, asset: &Asset) -> Result<(), GenerateError> {
        let dest = asset.dest(self.build_dir);
        let decision = self.decide(&asset.source, &dest)?;
        if !decision.needs_build() {
            debug!(path = %asset.path.display(), "up to date");
            return Ok(());
        }

        info!(path = %asset.path.display(), ?decision, "copying");
        create_parent(&dest)?;
        fs::copy(&asset.source, &dest).map_err(io_error(&asset.source))?;
        self.report.built.push(dest);
        Ok(())
    }
}

fn create_parent(dest: &Path) -> Result<(), GenerateError> {
    match dest.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(io_error(parent)),
        None => Ok(()),
    }
}

fn write_output(dest: &Path, contents: &[u8]) -> Result<(), GenerateError> {
    create_parent(dest)?;
    fs::write(dest, contents).map_err(io_error(dest))
}
