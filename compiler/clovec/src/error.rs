//! Driver errors.

use std::path::PathBuf;

use clove_lower::LowerError;
use thiserror::Error;

/// Failure to bring a unit into the source set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("source not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A `..` component climbed above the source root.
    #[error("import escapes the source root: {}", path.display())]
    OutsideRoot { path: PathBuf },
}

/// Any error that aborts a pipeline run. A failed run produces no output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("{}: {source}", path.display())]
    Lower {
        path: PathBuf,
        #[source]
        source: LowerError,
    },

    #[error(transparent)]
    Program(LowerError),
}
