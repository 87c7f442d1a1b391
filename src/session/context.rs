//! Request context
//!
//! Identity information the protocol engine attaches to every path
//! resolution request.

/// Opaque handle of one connected client
///
/// Stable for the lifetime of a single connection and never reused by the
/// protocol engine afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Context passed along with a path resolution request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Requesting client
    pub client: ClientId,

    /// Authenticated role taken from the request's security token, if any
    pub user: Option<String>,
}

impl RequestContext {
    /// Context for an unauthenticated request
    pub fn new(client: ClientId) -> Self {
        Self {
            client,
            user: None,
        }
    }

    /// Attach the authenticated user
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        let user = user.into();
        self.user = if user.is_empty() { None } else { Some(user) };
        self
    }

    /// Authenticated user, `None` for anonymous requests
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_context() {
        let ctx = RequestContext::new(ClientId(7));

        assert_eq!(ctx.client, ClientId(7));
        assert_eq!(ctx.user(), None);
    }

    #[test]
    fn test_empty_user_is_anonymous() {
        let ctx = RequestContext::new(ClientId(1)).with_user("");
        assert_eq!(ctx.user(), None);

        let ctx = RequestContext::new(ClientId(1)).with_user("alice");
        assert_eq!(ctx.user(), Some("alice"));
    }
}
