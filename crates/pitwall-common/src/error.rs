//! Common error types used throughout pitwall.
//!
//! The variants follow the reconciliation error policy: per-file failures
//! (`Parse`, `Lookup`, `ImageFormat`, `Write`) skip a single file, season-level
//! failures (`Fetch`, `Timeout`, `MixedSeasons`) abort one season directory, and
//! `Config` is the only kind that stops a whole run.

/// Common error type for pitwall.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A filename did not carry a usable season/episode token.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A round number was not present in the season calendar.
    #[error("Round {round} not found in season {season}")]
    Lookup {
        /// Season that was searched.
        season: u32,
        /// Round number that was requested.
        round: u32,
    },

    /// A remote source was unreachable or answered with a non-success status.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// A remote source did not answer before its deadline.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// A poster source returned something that is not the expected image type.
    #[error("Unexpected image format: {0}")]
    ImageFormat(String),

    /// Writing a metadata file or poster failed.
    #[error("Write error [{path}]: {message}")]
    Write {
        /// The file that could not be written.
        path: String,
        /// Human-readable error description.
        message: String,
    },

    /// A season directory holds files from more than one season.
    #[error("Directory mixes seasons {expected} and {found} ({file})")]
    MixedSeasons {
        /// Season parsed from the first missing-metadata file.
        expected: u32,
        /// The disagreeing season.
        found: u32,
        /// The file carrying the disagreeing season.
        file: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new Parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new Fetch error.
    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a new Timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a new ImageFormat error.
    pub fn image_format<S: Into<String>>(msg: S) -> Self {
        Self::ImageFormat(msg.into())
    }

    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Write error for `path`.
    pub fn write<P: AsRef<std::path::Path>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::Write {
            path: path.as_ref().display().to_string(),
            message: msg.into(),
        }
    }

    /// Whether a later run may succeed without any change on the user's side.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Timeout(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
