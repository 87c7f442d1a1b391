//! Application callbacks
//!
//! Every method has a permissive default, so an implementation only
//! overrides the hooks it cares about.

use crate::registry::Role;

/// Callbacks invoked by the mount point registry
///
/// Hooks are called synchronously from the engine's request path and must
/// not block. None of them runs while the registry lock is held.
pub trait RestreamHandler: Send + Sync + 'static {
    /// Decide whether `user` may access `path` at all
    ///
    /// `user` is `None` when the request carries no authenticated role.
    fn authorize_access(&self, user: Option<&str>, path: &str) -> bool {
        let _ = (user, path);
        true
    }

    /// Decide whether `user` may publish to or play from `path`
    ///
    /// Consulted after [`authorize_access`](Self::authorize_access) allowed the request.
    fn authorize_role(&self, user: Option<&str>, role: Role, path: &str) -> bool {
        let _ = (user, role, path);
        true
    }

    /// A new mount point was created for `path`
    fn on_mount_created(&self, path: &str) {
        let _ = path;
    }

    /// The last client referencing `path` left and its mount point was removed
    fn on_mount_removed(&self, path: &str) {
        let _ = path;
    }

    /// A publisher started feeding the channel behind `path`
    ///
    /// Runs on the thread that claimed the record endpoint.
    fn on_recorder_connected(&self, path: &str) {
        let _ = path;
    }

    /// The publisher feeding `path` went away
    fn on_recorder_disconnected(&self, path: &str) {
        let _ = path;
    }
}

/// Handler that admits everyone and ignores lifecycle events
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl RestreamHandler for AllowAll {}
