//! Ledger file loader with include resolution.
//!
//! The loader owns the growing directive stream. It reads a file, parses it
//! entry by entry, and acts on the meta entries in place: `option` settings
//! land in [`Options`], `include` references are descended depth-first so a
//! nested file's directives are appended before the parent's subsequent
//! entries. When the outermost file is done, the flat stream is stable-sorted
//! by (date, same-day priority).
//!
//! # Example
//!
//! ```ignore
//! use beanbook_loader::load;
//! use std::path::Path;
//!
//! let result = load(Path::new("ledger.bean"))?;
//! for directive in &result.directives {
//!     println!("{directive:?}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod options;

pub use options::Options;

use beanbook_core::{sort_directives, Directive};
use beanbook_parser::{Entry, ParseError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading a file.
    #[error("failed to read file {}: {}", .path.display(), .source)]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Include cycle detected.
    #[error("include cycle detected: {}", .cycle.join(" -> "))]
    IncludeCycle {
        /// The cycle of file paths.
        cycle: Vec<String>,
    },

    /// A structural parse error; the offending directive was dropped.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result of loading a ledger file and everything it includes.
#[derive(Debug, Default)]
pub struct LoadResult {
    /// All directives from all files, in evaluation order.
    pub directives: Vec<Directive>,
    /// Collected ledger options.
    pub options: Options,
    /// All non-fatal errors encountered during loading.
    pub errors: Vec<LoadError>,
}

/// Ledger file loader.
#[derive(Debug, Default)]
pub struct Loader {
    /// Stack of files currently being loaded, for cycle detection.
    include_stack: Vec<PathBuf>,
}

impl Loader {
    /// Create a new loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a ledger file and all its includes.
    ///
    /// Parse errors, unreadable includes and include cycles are collected
    /// in [`LoadResult::errors`]; only an unreadable root file fails the
    /// load outright.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when the root file cannot be read.
    pub fn load(&mut self, path: &Path) -> Result<LoadResult, LoadError> {
        let canonical = path.canonicalize().map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut result = LoadResult::default();
        self.load_recursive(&canonical, &mut result)?;

        // The one reordering pass: stable by (date, same-day priority).
        sort_directives(&mut result.directives);
        Ok(result)
    }

    fn load_recursive(&mut self, path: &Path, out: &mut LoadResult) -> Result<(), LoadError> {
        if self.include_stack.iter().any(|p| p == path) {
            let mut cycle: Vec<String> = self
                .include_stack
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            cycle.push(path.display().to_string());
            return Err(LoadError::IncludeCycle { cycle });
        }

        let source = fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.include_stack.push(path.to_path_buf());
        let parsed = beanbook_parser::parse(&source, path);
        out.errors.extend(parsed.errors.into_iter().map(LoadError::Parse));

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        for entry in parsed.entries {
            match entry {
                Entry::Directive(directive) => out.directives.push(directive),
                Entry::Option { name, value } => out.options.set(&name, &value),
                Entry::Include { path: include_path } => {
                    let full_path = base_dir.join(&include_path);
                    match full_path.canonicalize() {
                        Ok(canonical) => {
                            if let Err(e) = self.load_recursive(&canonical, out) {
                                out.errors.push(e);
                            }
                        }
                        Err(e) => out.errors.push(LoadError::Io {
                            path: full_path,
                            source: e,
                        }),
                    }
                }
            }
        }
        self.include_stack.pop();

        Ok(())
    }
}

/// Load a ledger file.
///
/// Convenience wrapper around a one-shot [`Loader`].
pub fn load(path: &Path) -> Result<LoadResult, LoadError> {
    Loader::new().load(path)
}
