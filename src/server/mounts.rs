//! Protocol engine boundary
//!
//! The registry never talks to the RTSP engine directly. It mounts endpoints
//! and asks for disconnect notifications through [`MountTable`], which the
//! engine integration implements. [`InMemoryMounts`] is a self-contained
//! implementation for embedding and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::endpoint::{PlayEndpoint, RecordEndpoint};
use crate::session::ClientId;

/// Callback fired once when a client connection closes
pub type DisconnectCallback = Box<dyn FnOnce() + Send + 'static>;

/// An endpoint as mounted in the protocol engine
#[derive(Debug, Clone)]
pub enum Endpoint {
    /// Subscribe side, mounted at the plain path
    Play(Arc<PlayEndpoint>),
    /// Publish side, mounted at the `?record` path
    Record(Arc<RecordEndpoint>),
}

impl Endpoint {
    pub fn is_record(&self) -> bool {
        matches!(self, Endpoint::Record(_))
    }
}

/// Mount primitives the protocol engine exposes to the registry
///
/// All methods are called synchronously and must not block on network I/O.
pub trait MountTable: Send + Sync {
    /// Serve `endpoint` at `path`
    fn mount(&self, path: &str, endpoint: Endpoint);

    /// Stop serving `path`
    fn unmount(&self, path: &str);

    /// Invoke `on_closed` once when `client` disconnects
    fn watch_disconnect(&self, client: ClientId, on_closed: DisconnectCallback);
}

/// In-process mount table
#[derive(Default)]
pub struct InMemoryMounts {
    endpoints: Mutex<BTreeMap<String, Endpoint>>,
    watchers: Mutex<HashMap<ClientId, DisconnectCallback>>,
}

impl InMemoryMounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoint mounted at `path`
    pub fn lookup(&self, path: &str) -> Option<Endpoint> {
        self.endpoints.lock().get(path).cloned()
    }

    /// All mounted paths, sorted
    pub fn mounted_paths(&self) -> Vec<String> {
        self.endpoints.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.endpoints.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.lock().is_empty()
    }

    /// Whether a disconnect callback is registered for `client`
    pub fn is_watching(&self, client: ClientId) -> bool {
        self.watchers.lock().contains_key(&client)
    }

    /// Simulate the connection of `client` closing
    ///
    /// Fires the registered callback, if any. Returns whether one was fired.
    pub fn close_client(&self, client: ClientId) -> bool {
        // Take the callback out first; it re-enters the registry
        let callback = self.watchers.lock().remove(&client);

        match callback {
            Some(on_closed) => {
                on_closed();
                true
            }
            None => false,
        }
    }
}

impl MountTable for InMemoryMounts {
    fn mount(&self, path: &str, endpoint: Endpoint) {
        let previous = self.endpoints.lock().insert(path.to_owned(), endpoint);
        if previous.is_some() {
            tracing::warn!(path = %path, "Replacing existing mount");
        }
    }

    fn unmount(&self, path: &str) {
        if self.endpoints.lock().remove(path).is_none() {
            tracing::warn!(path = %path, "Unmount of unknown path");
        }
    }

    fn watch_disconnect(&self, client: ClientId, on_closed: DisconnectCallback) {
        self.watchers.lock().insert(client, on_closed);
    }
}

impl std::fmt::Debug for InMemoryMounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryMounts")
            .field("paths", &self.mounted_paths())
            .field("watchers", &self.watchers.lock().len())
            .finish()
    }
}
