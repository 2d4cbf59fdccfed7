//! Errors raised by the generation pipeline.

use std::path::PathBuf;

/// Everything that can go wrong while generating assets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The font could not be opened or parsed.
    #[error("failed to load font {path}: {reason}")]
    FontLoad {
        /// The font that was requested.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
    /// A file looked like an image but could not be decoded.
    #[error("unsupported image {path}: {reason}")]
    UnsupportedImageFormat {
        /// The offending file.
        path: PathBuf,
        /// The decoder's complaint.
        reason: String,
    },
    /// No usable glyph box could be derived.
    #[error("glyph metrics out of range: {width}x{height}")]
    MetricsOverflow {
        /// The computed width, before it was rejected.
        width: i64,
        /// The computed height, before it was rejected.
        height: i64,
    },
    /// Reading or writing a file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// The file being touched.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The job file is missing or malformed.
    #[error("bad job file {path}: {reason}")]
    Config {
        /// The job file.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },
}

impl Error {
    /// Wrap an [`std::io::Error`] with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Shorthand used across the library modules.
pub type Result<T> = std::result::Result<T, Error>;
