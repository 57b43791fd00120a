use std::fmt;

/// Result type for logtriage-providers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while talking to a log backend
#[derive(Debug)]
pub enum Error {
    /// Transport-level failure (connect, timeout, decode)
    Http(reqwest::Error),

    /// Backend answered with a non-success status
    Status { code: u16, body: String },

    /// Response body could not be parsed
    Json(serde_json::Error),

    /// Backend returned the same pagination cursor twice in a row
    Cursor(String),
}

impl Error {
    /// Whether the caller may reasonably retry the whole query.
    ///
    /// Transport failures and 429/5xx answers are transient; everything else
    /// (bad credentials, malformed query, protocol violations) is fatal.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(_) => true,
            Error::Status { code, .. } => *code == 429 || *code >= 500,
            Error::Json(_) | Error::Cursor(_) => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(err) => write!(f, "HTTP error: {}", err),
            Error::Status { code, body } => {
                write!(f, "Backend returned status {}: {}", code, body)
            }
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Cursor(cursor) => {
                write!(f, "Backend repeated pagination cursor {:?}", cursor)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Status { .. } | Error::Cursor(_) => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
