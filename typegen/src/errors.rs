use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T, E = TypegenError> = std::result::Result<T, E>;

/// Fatal errors that abort a generation run before any output is written.
///
/// Recoverable problems (unresolved relation targets, dangling parents, missing
/// optional directories) are reported as [`crate::Diagnostic`]s instead.
#[derive(Debug, Error)]
pub enum TypegenError {
    /// No directory containing entity sources could be located.
    #[error("no entity source directory found; tried: {}", display_paths(.tried))]
    SourceNotFound { tried: Vec<PathBuf> },

    /// A source unit or configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output module could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source unit contained syntax errors while strict parsing was enabled.
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// The TypeScript grammar could not be loaded into the parser.
    #[error("typescript grammar could not be loaded: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    /// The configuration file is malformed.
    #[error("invalid configuration in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl TypegenError {
    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no candidates configured)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
