//! Incremental build decisions.
//!
//! A file is rebuilt when any of these holds, checked in order:
//!
//! 1. its source path is in the force list (`quill build -f posts/a.md`)
//! 2. force-all is set (`quill build -f`)
//! 3. the destination does not exist
//! 4. the source was modified strictly after the destination
//!
//! Otherwise it is left alone. Modification times are the only state carried
//! between runs. The evaluation reads nothing but its arguments and the two
//! files' timestamps, so the same tree and flags always give the same answer.
//!
//! Unpublished pages never reach this check: they are skipped before it, so
//! they can never land in the output tree even when forced.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Why a file was or wasn't rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Listed explicitly on the command line.
    Forced,
    /// Every file was forced.
    ForcedAll,
    /// Nothing at the destination yet.
    Missing,
    /// Source is newer than the destination.
    Stale,
    /// Destination is at least as new as the source.
    UpToDate,
}

impl Decision {
    pub fn needs_build(self) -> bool {
        !matches!(self, Decision::UpToDate)
    }
}

/// Decide whether `dest` must be regenerated from `source`.
pub fn evaluate(
    source: &Path,
    dest: &Path,
    force_list: &[PathBuf],
    force_all: bool,
) -> io::Result<Decision> {
    if force_list.iter().any(|forced| forced == source) {
        return Ok(Decision::Forced);
    }
    if force_all {
        return Ok(Decision::ForcedAll);
    }

    let dest_modified = match fs::metadata(dest) {
        Ok(meta) if meta.is_file() => meta.modified()?,
        Ok(_) => return Ok(Decision::Missing),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Decision::Missing),
        Err(e) => return Err(e),
    };
    let source_modified = fs::metadata(source)?.modified()?;

    if source_modified > dest_modified {
        Ok(Decision::Stale)
    } else {
        Ok(Decision::UpToDate)
    }
}

/// `true` when `dest` must be regenerated from `source`.
pub fn should_build(
    source: &Path,
    dest: &Path,
    force_list: &[PathBuf],
    force_all: bool,
) -> io::Result<bool> {
    evaluate(source, dest, force_list, force_all).map(Decision::needs_build)
}

/// Force flags for a build run.
///
/// Listed paths are resolved against the site root, so they compare equal
/// to the source paths pages and assets are read from.
#[derive(Debug, Clone, Default)]
pub struct Force {
    pub all: bool,
    pub files: Vec<PathBuf>,
}

impl Force {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            all: true,
            files: Vec::new(),
        }
    }

    pub fn files<I, P>(root: &Path, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            all: false,
            files: files.into_iter().map(|f| root.join(f)).collect(),
        }
    }

    /// `-f` without arguments forces everything; `-f a b` forces `a` and `b`.
    pub fn from_cli(root: &Path, force: Option<Vec<PathBuf>>) -> Self {
        match force {
            None => Self::none(),
            Some(files) if files.is_empty() => Self::all(),
            Some(files) => Self::files(root, files),
        }
    }

    pub fn evaluate(&self, source: &Path, dest: &Path) -> io::Result<Decision> {
        evaluate(source, dest, &self.files, self.all)
    }
}

/// Tally of build decisions for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildStats {
    pub built: u32,
    pub up_to_date: u32,
    pub unpublished: u32,
}

impl BuildStats {
    pub fn record(&mut self, decision: Decision) {
        if decision.needs_build() {
            self.built += 1;
        } else {
            self.up_to_date += 1;
        }
    }

    pub fn unpublished(&mut self) {
        self.unpublished += 1;
    }

    pub fn total(&self) -> u32 {
        self.built + self.up_to_date + self.unpublished
    }
}

impl fmt::Display for BuildStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} built, {} up to date", self.built, self.up_to_date)?;
        if self.unpublished > 0 {
            write!(f, ", {} unpublished", self.unpublished)?;
        }
        write!(f, " ({} total)", self.total())
    }
}
