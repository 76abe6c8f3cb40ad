//! Error types for the instrumenter.

use std::path::PathBuf;

use condcov_syntax::Pos;
use thiserror::Error;

/// Any fatal condition raised while instrumenting a package.
///
/// The instrumenter never produces partially-instrumented output: the first
/// error aborts the whole run and propagates to the caller.
#[derive(Debug, Error)]
pub enum InstrumentError {
    /// The input source failed to parse. The message already contains the
    /// pretty-printed diagnostic with a source snippet.
    #[error("{file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// A construct the rewriter cannot handle safely, such as a test-main
    /// function whose exit site is not an explicit exit call.
    #[error("{file}:{pos}: {message}")]
    UnsupportedConstruct {
        file: PathBuf,
        pos: Pos,
        message: String,
    },

    /// No module descriptor was found walking up from the package directory,
    /// so the package's import path cannot be resolved.
    #[error("no module descriptor found above {dir}")]
    ModuleNotFound { dir: PathBuf },

    /// Reading an input or writing an output file failed.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InstrumentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InstrumentError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, InstrumentError>;
