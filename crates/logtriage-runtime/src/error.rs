use std::fmt;

/// Result type for logtriage-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Configuration error (missing credentials, malformed settings)
    Config(String),

    /// Log backend query failed
    Backend(logtriage_providers::Error),

    /// The injected assistant failed outright (not a parse failure)
    Assistant(String),

    /// Issue creation was rejected by the source-control API
    Issue(String),

    /// Workflow driven from a stage that does not accept that operation
    InvalidOperation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Backend(err) => write!(f, "Log backend error: {}", err),
            Error::Assistant(msg) => write!(f, "Assistant error: {}", msg),
            Error::Issue(msg) => write!(f, "Issue creation failed: {}", msg),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Backend(err) => Some(err),
            Error::Config(_)
            | Error::Assistant(_)
            | Error::Issue(_)
            | Error::InvalidOperation(_) => None,
        }
    }
}

impl From<logtriage_providers::Error> for Error {
    fn from(err: logtriage_providers::Error) -> Self {
        Error::Backend(err)
    }
}
