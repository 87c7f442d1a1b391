//! Registry error types
//!
//! Rejection reasons for path resolution requests.

/// Which capacity limit rejected a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityLimit {
    /// Maximum number of distinct paths reached
    Paths,
    /// Maximum number of clients on this path reached
    ClientsPerPath,
}

/// Error type for path resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The authorization gate refused the request
    AuthorizationDenied,
    /// A configured capacity limit was reached
    CapacityExceeded(CapacityLimit),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::AuthorizationDenied => write!(f, "Authorization denied"),
            ResolveError::CapacityExceeded(CapacityLimit::Paths) => {
                write!(f, "Max paths count reached")
            }
            ResolveError::CapacityExceeded(CapacityLimit::ClientsPerPath) => {
                write!(f, "Max clients count per path reached")
            }
        }
    }
}

impl std::error::Error for ResolveError {}
