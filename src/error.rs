//! Error types

use crate::endpoint::EndpointError;
use crate::registry::ResolveError;

/// Top-level error type
#[derive(Debug, Clone)]
pub enum Error {
    /// Path resolution was rejected
    Resolve(ResolveError),
    /// Endpoint operation failed
    Endpoint(EndpointError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Resolve(e) => write!(f, "Resolve error: {}", e),
            Error::Endpoint(e) => write!(f, "Endpoint error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Resolve(e) => Some(e),
            Error::Endpoint(e) => Some(e),
        }
    }
}

impl From<ResolveError> for Error {
    fn from(e: ResolveError) -> Self {
        Error::Resolve(e)
    }
}

impl From<EndpointError> for Error {
    fn from(e: EndpointError) -> Self {
        Error::Endpoint(e)
    }
}
