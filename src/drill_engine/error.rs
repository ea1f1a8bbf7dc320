//! Error types for the drill engine.
//!
//! Almost nothing in a drill is fatal: evaluation failures prune branches,
//! dataset failures degrade to empty datasets, and unparseable answers are
//! simply wrong. What remains is configuration/dataset parsing and starting a
//! session over an empty sequence.

use std::path::PathBuf;

/// A specialized `Result` type for drill engine operations.
pub type Result<T> = std::result::Result<T, DrillError>;

/// Errors raised by the drill engine.
#[derive(Debug, thiserror::Error)]
pub enum DrillError {
    /// Configuration file or string could not be parsed.
    #[error("Invalid drill config '{path}': {message}")]
    ConfigParse {
        /// Where the configuration came from (`<inline>` for strings).
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A question dataset could not be parsed.
    #[error("Dataset '{dataset}' could not be loaded: {message}")]
    DatasetParse {
        /// Dataset tag (e.g. `pot-odds`).
        dataset: String,
        /// Parser message.
        message: String,
    },

    /// A session was started with nothing to practise.
    #[error("No questions available for this selection")]
    EmptySequence,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DrillError {
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn dataset_parse(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DatasetParse {
            dataset: dataset.into(),
            message: message.into(),
        }
    }
}
