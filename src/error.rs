use std::fmt::{self, Debug, Display, Formatter};
use std::io;
use std::path::PathBuf;

use crate::line::LineKind;
use crate::state::State;

/// A set of errors that can end an upload session.
///
/// Every variant is terminal: the session that produced it is in
/// [`State::Failed`] and will not accept further lines.
#[non_exhaustive]
pub enum Error {
    /// The `Content-Type` header is absent, is not `multipart/form-data`, or
    /// carries no `boundary` attribute.
    MissingBoundary { content_type: Option<String> },

    /// A line was classified into a kind that has no valid edge from the
    /// current state.
    UnexpectedTransition { state: State, line: LineKind },

    /// The destination file couldn't be created or written.
    FileOpenFailure { path: PathBuf, cause: io::Error },

    /// The source ended while a part or the terminal boundary was still
    /// expected.
    StreamTruncated { state: State },

    /// Reading from the source failed.
    StreamReadFailed(io::Error),

    /// The incoming stream size exceeded the maximum limit.
    StreamSizeExceeded { limit: u64 },

    /// A single part exceeded the maximum size limit.
    PartSizeExceeded { limit: u64, filename: String },

    /// Failed to encode an [`Outcome`](crate::Outcome) as `JSON`.
    #[cfg(feature = "json")]
    #[cfg_attr(nightly, doc(cfg(feature = "json")))]
    EncodeJson(serde_json::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingBoundary { content_type } => write!(
                f,
                "multipart boundary not found in Content-Type: {}",
                content_type.as_deref().unwrap_or("<absent>")
            ),
            Error::UnexpectedTransition { state, line } => {
                write!(f, "unexpected {} line in state {}", line, state)
            }
            Error::FileOpenFailure { path, cause } => {
                write!(f, "cannot open file {}: {}", path.display(), cause)
            }
            Error::StreamTruncated { state } => {
                write!(f, "stream ended unexpectedly in state {}", state)
            }
            Error::StreamReadFailed(err) => write!(f, "stream read failed: {}", err),
            Error::StreamSizeExceeded { limit } => {
                write!(f, "stream size exceeded the maximum limit: {} bytes", limit)
            }
            Error::PartSizeExceeded { limit, filename } => write!(
                f,
                "part '{}' exceeded the maximum size limit: {} bytes",
                filename, limit
            ),
            #[cfg(feature = "json")]
            Error::EncodeJson(err) => write!(f, "failed to encode outcome as JSON: {}", err),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FileOpenFailure { cause, .. } => Some(cause),
            Error::StreamReadFailed(err) => Some(err),
            #[cfg(feature = "json")]
            Error::EncodeJson(err) => Some(err),
            _ => None,
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

impl Eq for Error {}
