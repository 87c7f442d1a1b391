//! Authorization gate
//!
//! Stateless admission check run before any registry bookkeeping. The policy
//! itself belongs to the application's [`RestreamHandler`]; without one
//! every request is allowed.

use crate::registry::Role;
use crate::server::handler::RestreamHandler;

/// Admission check over (user, path)
pub struct AuthorizationGate<'a, H: RestreamHandler> {
    handler: &'a H,
}

impl<'a, H: RestreamHandler> AuthorizationGate<'a, H> {
    pub fn new(handler: &'a H) -> Self {
        Self { handler }
    }

    /// Whether `user` may access `path`
    pub fn check(&self, user: Option<&str>, path: &str) -> bool {
        self.handler.authorize_access(user, path)
    }

    /// Whether `user` may access `path` in the given role
    pub fn check_role(&self, user: Option<&str>, role: Role, path: &str) -> bool {
        self.check(user, path) && self.handler.authorize_role(user, role, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::handler::AllowAll;

    struct PublishersOnly;

    impl RestreamHandler for PublishersOnly {
        fn authorize_access(&self, user: Option<&str>, path: &str) -> bool {
            user.is_some() || !path.starts_with("/private")
        }

        fn authorize_role(&self, user: Option<&str>, role: Role, _path: &str) -> bool {
            role == Role::Subscribe || user == Some("publisher")
        }
    }

    #[test]
    fn test_default_allows_everything() {
        let gate = AuthorizationGate::new(&AllowAll);

        assert!(gate.check(None, "/anything"));
        assert!(gate.check_role(None, Role::Publish, "/anything"));
    }

    #[test]
    fn test_access_policy() {
        let handler = PublishersOnly;
        let gate = AuthorizationGate::new(&handler);

        assert!(gate.check(None, "/public"));
        assert!(!gate.check(None, "/private/cam"));
        assert!(gate.check(Some("viewer"), "/private/cam"));
    }

    #[test]
    fn test_role_policy() {
        let handler = PublishersOnly;
        let gate = AuthorizationGate::new(&handler);

        assert!(gate.check_role(Some("viewer"), Role::Subscribe, "/cam"));
        assert!(!gate.check_role(Some("viewer"), Role::Publish, "/cam"));
        assert!(gate.check_role(Some("publisher"), Role::Publish, "/cam"));

        // Access denial wins over an allowed role
        assert!(!gate.check_role(None, Role::Subscribe, "/private/cam"));
    }
}
