//! gmlfmt formatter
//!
//! Public formatting API for GameMaker Language files. Wraps the pipeline in
//! gml-core and adds checking and parallel batch formatting.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

pub use gml_core::{
    FormatOptions, FormatterConfiguration, GmlError, GmlFmtConfiguration, IndentStyle, Result,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format GML source text
pub fn format(source: &str, options: &FormatOptions) -> Result<String> {
    gml_core::format(source, options)
}

/// True when `source` is already formatted
pub fn check(source: &str, options: &FormatOptions) -> Result<bool> {
    Ok(format(source, options)? == source)
}

/// What formatting did to one file
#[derive(Debug)]
pub enum FormatOutcome {
    Unchanged,
    Changed { formatted: String },
    Failed { error: GmlError },
}

impl FormatOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, FormatOutcome::Changed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FormatOutcome::Failed { .. })
    }
}

/// Result of formatting one file
#[derive(Debug)]
pub struct FileFormatResult {
    pub path: PathBuf,
    /// Original file contents; empty when the file could not be read
    pub original: String,
    pub outcome: FormatOutcome,
}

/// Format a single file without writing it
pub fn format_file(path: &Path, options: &FormatOptions) -> FileFormatResult {
    let original = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            debug!("Skipping {}: {}", path.display(), error);
            return FileFormatResult {
                path: path.to_path_buf(),
                original: String::new(),
                outcome: FormatOutcome::Failed {
                    error: GmlError::io_error(path, error),
                },
            };
        }
    };

    let outcome = match format(&original, options) {
        Ok(formatted) if formatted == original => FormatOutcome::Unchanged,
        Ok(formatted) => FormatOutcome::Changed { formatted },
        Err(error) => {
            debug!("Skipping {}: {}", path.display(), error);
            FormatOutcome::Failed { error }
        }
    };
    debug!(path = %path.display(), changed = outcome.is_changed(), "formatted file");

    FileFormatResult {
        path: path.to_path_buf(),
        original,
        outcome,
    }
}

/// Format many files in parallel
///
/// Every file runs its own pipeline; results come back in input order.
pub fn format_files(paths: &[PathBuf], options: &FormatOptions) -> Vec<FileFormatResult> {
    paths
        .par_iter()
        .map(|path| format_file(path, options))
        .collect()
}

/// Write changed files back to disk
///
/// Returns the number of files written.
pub fn write_changes(results: &[FileFormatResult]) -> Result<usize> {
    let mut written = 0;
    for result in results {
        if let FormatOutcome::Changed { formatted } = &result.outcome {
            fs::write(&result.path, formatted).map_err(|e| GmlError::io_error(&result.path, e))?;
            written += 1;
        }
    }
    Ok(written)
}

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use super::{
        FileFormatResult, FormatOptions, FormatOutcome, GmlError, check, format, format_files,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check() {
        let options = FormatOptions::default();
        assert!(check("x = 1;\n", &options).unwrap());
        assert!(!check("x=1", &options).unwrap());
        assert!(check("x = \"", &options).is_err());
    }

    #[test]
    fn test_outcome_predicates() {
        let changed = FormatOutcome::Changed {
            formatted: String::new(),
        };
        assert!(changed.is_changed());
        assert!(!FormatOutcome::Unchanged.is_changed());
        assert!(
            FormatOutcome::Failed {
                error: GmlError::config_error("x")
            }
            .is_failed()
        );
    }
}
