//! Client session tracking
//!
//! Maps every connected client to the set of paths it currently holds.
//! The tracker has no locking of its own: it lives inside the registry's
//! tables and is only touched under the registry lock.

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use super::context::ClientId;

/// Paths held by one client
#[derive(Debug)]
pub struct ClientSession {
    /// Paths this client has successfully resolved
    pub held_paths: BTreeSet<String>,

    /// When the client first resolved a path
    pub first_seen: Instant,
}

impl ClientSession {
    fn new() -> Self {
        Self {
            held_paths: BTreeSet::new(),
            first_seen: Instant::now(),
        }
    }
}

/// Tracks which paths each client references
#[derive(Debug, Default)]
pub struct ClientSessionTracker {
    sessions: HashMap<ClientId, ClientSession>,
}

impl ClientSessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a client
    ///
    /// Returns `true` if the client was not seen before.
    pub fn track(&mut self, client: ClientId) -> bool {
        if self.sessions.contains_key(&client) {
            return false;
        }

        self.sessions.insert(client, ClientSession::new());
        true
    }

    /// Record that `client` holds `path`
    ///
    /// Returns `true` if the path was newly added to the client's set.
    pub fn hold(&mut self, client: ClientId, path: &str) -> bool {
        self.sessions
            .entry(client)
            .or_insert_with(ClientSession::new)
            .held_paths
            .insert(path.to_owned())
    }

    pub fn holds(&self, client: ClientId, path: &str) -> bool {
        self.sessions
            .get(&client)
            .is_some_and(|session| session.held_paths.contains(path))
    }

    pub fn is_tracked(&self, client: ClientId) -> bool {
        self.sessions.contains_key(&client)
    }

    /// Paths currently held by `client`
    pub fn held_paths(&self, client: ClientId) -> Vec<String> {
        self.sessions
            .get(&client)
            .map(|session| session.held_paths.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of clients holding `path`
    pub fn holders(&self, path: &str) -> usize {
        self.sessions
            .values()
            .filter(|session| session.held_paths.contains(path))
            .count()
    }

    /// Sum of the held path counts over all clients
    pub fn total_references(&self) -> usize {
        self.sessions
            .values()
            .map(|session| session.held_paths.len())
            .sum()
    }

    /// Number of tracked clients
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Process a disconnect notification
    ///
    /// Calls `release` once for every path the client held, then forgets the
    /// client. Unknown clients are a no-op: either they never resolved a path
    /// or their disconnect was already processed.
    pub fn on_disconnect<F>(&mut self, client: ClientId, mut release: F)
    where
        F: FnMut(&str),
    {
        let Some(session) = self.sessions.remove(&client) else {
            tracing::debug!(client = %client, "Client didn't use any path");
            return;
        };

        tracing::debug!(
            client = %client,
            paths = session.held_paths.len(),
            connected_secs = session.first_seen.elapsed().as_secs(),
            "Releasing client paths"
        );

        for path in &session.held_paths {
            release(path);
        }
    }

    /// Forget every client
    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_once() {
        let mut tracker = ClientSessionTracker::new();

        assert!(tracker.track(ClientId(1)));
        assert!(!tracker.track(ClientId(1)));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_hold_is_idempotent() {
        let mut tracker = ClientSessionTracker::new();
        tracker.track(ClientId(1));

        assert!(tracker.hold(ClientId(1), "/cam1"));
        assert!(!tracker.hold(ClientId(1), "/cam1"));
        assert!(tracker.hold(ClientId(1), "/cam2"));

        assert!(tracker.holds(ClientId(1), "/cam1"));
        assert!(!tracker.holds(ClientId(2), "/cam1"));
        assert_eq!(tracker.held_paths(ClientId(1)), vec!["/cam1", "/cam2"]);
    }

    #[test]
    fn test_disconnect_releases_each_path_once() {
        let mut tracker = ClientSessionTracker::new();
        tracker.track(ClientId(1));
        tracker.hold(ClientId(1), "/a");
        tracker.hold(ClientId(1), "/b");
        tracker.track(ClientId(2));
        tracker.hold(ClientId(2), "/a");

        let mut released = Vec::new();
        tracker.on_disconnect(ClientId(1), |path| released.push(path.to_owned()));

        assert_eq!(released, vec!["/a", "/b"]);
        assert!(!tracker.is_tracked(ClientId(1)));
        assert_eq!(tracker.holders("/a"), 1);
    }

    #[test]
    fn test_disconnect_unknown_client_is_noop() {
        let mut tracker = ClientSessionTracker::new();
        let mut calls = 0;

        tracker.on_disconnect(ClientId(42), |_| calls += 1);

        assert_eq!(calls, 0);
        assert!(tracker.is_empty());
    }
}
