use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    /// An OS-level failure tied to the file it happened on.
    #[error("{}: {source}", .path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Text that is not hex, not UTF-8, or blank.
    #[error("bad encoding: {0}")]
    Encoding(String),

    #[error("gzip stream: {0}")]
    Gzip(String),

    #[error("session format {found} is not supported (expected {expected})")]
    Version { found: String, expected: &'static str },

    #[error("session signature does not match its payload")]
    Signature,

    #[error("parameters contain non-finite values")]
    NonFinite,

    #[error("no session file at {}", .0.display())]
    Missing(PathBuf),

    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    pub fn at(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Path {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True when the content was readable but refused: bad encoding, wrong
    /// format version, broken signature or unrepresentable numbers.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        match self {
            Self::Encoding(_) | Self::Version { .. } | Self::Signature | Self::NonFinite => true,
            Self::Context { source, .. } => source.is_rejection(),
            _ => false,
        }
    }
}
