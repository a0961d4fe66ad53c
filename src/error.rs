//! Report error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can surface from loading input or emitting a report.
///
/// Shape problems in individual records are recovered locally and never
/// reach this type; an empty registry is a distinct outcome, not an error.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Reading an input file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader could not be opened or read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serializing the document model failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file or environment could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// A chart could not be drawn.
    #[error("unable to render chart: {0}")]
    ChartRender(String),

    /// Another generation holds the lock for this output path.
    #[error("a report generation is already in progress for {}", .path.display())]
    GenerationInProgress {
        /// Target path of the document.
        path: PathBuf,
    },

    /// Writing the output document failed. Nothing was left at `path`.
    #[error("unable to write report to {}: {source}", .path.display())]
    Emission {
        /// Target path of the document.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },
}
