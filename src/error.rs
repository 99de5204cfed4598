//! Error types for plot configuration, data loading and drawing.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid plot configuration. Aborts the current operation without touching
/// any previously rendered state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No data source was given at construction.
    #[error("a data source url is required")]
    MissingSource,

    /// Neither factor nor value columns were configured.
    #[error("at least one of 'factors', 'values' is required")]
    NoColumnRoles,

    /// Panel size must leave room for the padding.
    #[error("panel size {size} must be larger than padding {padding}")]
    InvalidGeometry { size: u32, padding: u32 },

    /// Requested primary column is not in the data.
    #[error("primary value '{column}' not in data values")]
    PrimaryNotFound { column: String },

    /// A configured factor or value column is not in the data.
    #[error("{role} column '{column}' not found in data")]
    UnknownColumn { role: ColumnRole, column: String },
}

/// Role of a configured column, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Factor,
    Value,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnRole::Factor => f.write_str("factor"),
            ColumnRole::Value => f.write_str("value"),
        }
    }
}

/// Failure to fetch or parse the tabular data source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the source.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the source contents.
    #[error("error parsing {origin}: {message}")]
    Parse { origin: String, message: String },

    /// Source had a header but no records.
    #[error("{origin} must contain at least one data row")]
    Empty { origin: String },
}

/// Errors surfaced by the plot orchestrator.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Load(#[from] LoadError),

    /// A draw was requested while the first data load is still outstanding.
    #[error("a data load is already pending")]
    LoadPending,

    /// A load completion arrived with no load outstanding.
    #[error("no data load is pending")]
    NoLoadPending,

    /// Brush input arrived before anything was plotted.
    #[error("nothing has been plotted yet")]
    NotReady,

    /// Brush input referenced a panel that does not exist.
    #[error("panel {index} does not exist ({count} panels)")]
    UnknownPanel { index: usize, count: usize },

    /// The rendering backend failed.
    #[error("render failed: {0}")]
    Render(String),
}
