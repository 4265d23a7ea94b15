//! Build and site configuration.
//!
//! Two layers, kept apart:
//!
//! - [`BuildConfig`]: where things live (build output, templates, posts) and
//!   what discovery skips. Set from the command line, with defaults.
//! - The site document, `config.yaml` at the site root: free-form YAML
//!   handed to templates as `site.<key>`. Optional.
//!
//! ```yaml
//! # config.yaml
//! title: My Blog
//! author: Jane Doe
//! links:
//!   github: https://github.com/jane
//! ```
//!
//! `categories`, `tags` and `posts` are filled in by the build and cannot be
//! set in the site document.

use serde_yaml_ng::{Mapping, Value};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::frontmatter::value_kind;
use crate::scan::ScanOptions;

/// Keys of `site` owned by the build.
pub const RESERVED_SITE_KEYS: &[&str] = &["categories", "tags", "posts"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Directory layout of a build.
///
/// Relative paths are resolved against the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Where rendered pages and copied assets go.
    pub build_dir: PathBuf,
    /// Where layouts (`base.html`, ...) are loaded from.
    pub templates_dir: PathBuf,
    /// Top-level directory holding dated posts.
    pub posts_dir: String,
    /// Name of the site document at the root.
    pub config_file: String,
    /// Other top-level directories that are never content.
    pub reserved_dirs: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("build"),
            templates_dir: PathBuf::from("templates"),
            posts_dir: "posts".to_string(),
            config_file: "config.yaml".to_string(),
            reserved_dirs: vec!["src".into(), "target".into(), "tests".into()],
        }
    }
}

impl BuildConfig {
    /// Validate directory settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("build_dir must not be empty".into()));
        }
        if self.templates_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "templates_dir must not be empty".into(),
            ));
        }
        if !is_single_name(&self.posts_dir) {
            return Err(ConfigError::Validation(format!(
                "posts_dir must be a single top-level directory name, got '{}'",
                self.posts_dir
            )));
        }
        if !is_single_name(&self.config_file) {
            return Err(ConfigError::Validation(format!(
                "config_file must be a file name at the site root, got '{}'",
                self.config_file
            )));
        }
        Ok(())
    }

    pub fn build_path(&self, root: &Path) -> PathBuf {
        root.join(&self.build_dir)
    }

    pub fn templates_path(&self, root: &Path) -> PathBuf {
        root.join(&self.templates_dir)
    }

    /// Top-level names discovery skips: the build and templates directories
    /// (when they sit inside the root) plus the reserved directories.
    pub fn ignore_dirs(&self) -> Vec<String> {
        let mut dirs: Vec<String> = [&self.templates_dir, &self.build_dir]
            .into_iter()
            .filter_map(|dir| top_level_name(dir))
            .collect();
        for reserved in &self.reserved_dirs {
            if !dirs.contains(reserved) {
                dirs.push(reserved.clone());
            }
        }
        dirs
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            ignore_dirs: self.ignore_dirs(),
            config_file: self.config_file.clone(),
        }
    }
}

fn is_single_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// First component of a relative path; `None` for absolute paths.
fn top_level_name(dir: &Path) -> Option<String> {
    if dir.is_absolute() {
        return None;
    }
    dir.components().find_map(|c| match c {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        _ => None,
    })
}

/// Load the site document `root/<file>` as a YAML mapping.
///
/// Returns an empty mapping if the file does not exist or is empty.
/// Returns `Err` if the file is not valid YAML, is not a mapping, or sets a
/// key the build owns.
pub fn load_site_config(root: &Path, file: &str) -> Result<Mapping, ConfigError> {
    let path = root.join(file);
    if !path.exists() {
        return Ok(Mapping::new());
    }
    let content = fs::read_to_string(&path)?;
    parse_site_config(&content)
}

fn parse_site_config(content: &str) -> Result<Mapping, ConfigError> {
    let mapping = match serde_yaml_ng::from_str::<Value>(content)? {
        Value::Null => Mapping::new(),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(ConfigError::Validation(format!(
                "site config must be a mapping, got {}",
                value_kind(&other)
            )));
        }
    };

    if let Some(key) = RESERVED_SITE_KEYS
        .iter()
        .find(|key| mapping.contains_key(**key))
    {
        return Err(ConfigError::Validation(format!(
            "'{key}' is generated by the build and cannot be set in the site config"
        )));
    }
    Ok(mapping)
}

/// Returns a commented starter `config.yaml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_yaml() -> &'static str {
    r##"# Site configuration
# ==================
# Every key here is available to templates as `site.<key>`:
#
#   <title>{{ site.title }}</title>
#
# The file is optional and free-form. `categories`, `tags` and `posts` are
# filled in by the build and cannot be set here.

title: My Blog
description: Notes, mostly about code.
author: Your Name

# Nested values work too: {{ site.links.github }}
links:
  github: https://github.com/you
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // =========================================================================
    // BuildConfig
    // =========================================================================

    #[test]
    fn default_config_passes_validation() {
        BuildConfig::default().validate().unwrap();
    }

    #[test]
    fn default_ignore_set() {
        assert_eq!(
            BuildConfig::default().ignore_dirs(),
            vec!["templates", "build", "src", "target", "tests"]
        );
    }

    #[test]
    fn ignore_set_uses_top_level_of_nested_dirs() {
        let config = BuildConfig {
            build_dir: PathBuf::from("out/site"),
            templates_dir: PathBuf::from("./layouts"),
            reserved_dirs: vec!["out".into()],
            ..BuildConfig::default()
        };
        assert_eq!(config.ignore_dirs(), vec!["layouts", "out"]);
    }

    #[test]
    fn absolute_build_dir_is_not_ignored() {
        let config = BuildConfig {
            build_dir: PathBuf::from("/tmp/out"),
            reserved_dirs: vec![],
            ..BuildConfig::default()
        };
        assert_eq!(config.ignore_dirs(), vec!["templates"]);
        assert_eq!(config.build_path(Path::new("site")), Path::new("/tmp/out"));
    }

    #[test]
    fn scan_options_carry_config_file() {
        let options = BuildConfig::default().scan_options();
        assert_eq!(options.config_file, "config.yaml");
        assert!(options.ignore_dirs.contains(&"build".to_string()));
    }

    #[test]
    fn validate_rejects_nested_posts_dir() {
        let config = BuildConfig {
            posts_dir: "blog/posts".into(),
            ..BuildConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_build_dir() {
        let config = BuildConfig {
            build_dir: PathBuf::new(),
            ..BuildConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Site document
    // =========================================================================

    #[test]
    fn missing_site_config_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(load_site_config(tmp.path(), "config.yaml").unwrap().is_empty());
    }

    #[test]
    fn empty_site_config_is_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.yaml"), "").unwrap();
        assert!(load_site_config(tmp.path(), "config.yaml").unwrap().is_empty());
    }

    #[test]
    fn site_config_keys_are_loaded() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.yaml"),
            "title: My Blog\nlinks:\n  github: https://example.com\n",
        )
        .unwrap();
        let config = load_site_config(tmp.path(), "config.yaml").unwrap();
        assert_eq!(config["title"], Value::from("My Blog"));
        assert_eq!(config["links"]["github"], Value::from("https://example.com"));
    }

    #[test]
    fn invalid_yaml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.yaml"), "title: [unclosed").unwrap();
        let result = load_site_config(tmp.path(), "config.yaml");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn non_mapping_site_config_is_rejected() {
        let err = parse_site_config("- a\n- b\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("a list"));
    }

    #[test]
    fn reserved_keys_are_rejected() {
        for key in RESERVED_SITE_KEYS {
            let err = parse_site_config(&format!("{key}: []\n")).unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
    }

    #[test]
    fn stock_config_parses() {
        let config = parse_site_config(stock_config_yaml()).unwrap();
        assert_eq!(config["title"], Value::from("My Blog"));
    }
}
