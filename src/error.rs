//! Crate-level error type

/// Errors surfaced by the server and scheduler
#[derive(Debug)]
pub enum Error {
    /// Socket bind/accept failure
    Io(std::io::Error),
    /// The dispatch loop was already started
    AlreadyRunning,
}

/// Result alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::AlreadyRunning => write!(f, "Dispatch loop already running"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::AlreadyRunning => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
