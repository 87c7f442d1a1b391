//! Mount point registry implementation
//!
//! The central registry that turns path requests into mount points and
//! reference-counts them per client.
//!
//! Both tables (path -> entry, client -> held paths) sit behind a single
//! mutex. `resolve_path`, `client_closed` and `shutdown` each take it once
//! and run their whole read-modify-write under it, so a disconnect racing a
//! new request on the same path always sees a consistent pair of tables.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::auth::AuthorizationGate;
use crate::endpoint::{ChannelName, EndpointFactoryPair, EndpointPair, FeedEvent, FeedHook};
use crate::server::config::MountConfig;
use crate::server::handler::{AllowAll, RestreamHandler};
use crate::server::mounts::{Endpoint, MountTable};
use crate::session::{ClientId, ClientSessionTracker, RequestContext};
use crate::stats::{RegistryCounters, RegistryStats};

use super::entry::{PathEntry, PathStats};
use super::error::{CapacityLimit, ResolveError};
use super::path::{canonical_path, record_path, RequestUrl};

struct Tables {
    paths: HashMap<String, PathEntry>,
    sessions: ClientSessionTracker,
}

/// Registry of mounted paths and the clients referencing them
pub struct MountPointRegistry<H: RestreamHandler> {
    tables: Mutex<Tables>,
    mounts: Arc<dyn MountTable>,
    handler: H,
    factory: EndpointFactoryPair,
    config: MountConfig,
    counters: RegistryCounters,
}

impl MountPointRegistry<AllowAll> {
    /// Create a registry that admits every request
    pub fn new(config: MountConfig, mounts: Arc<dyn MountTable>) -> Arc<Self> {
        Self::with_handler(config, AllowAll, mounts)
    }
}

impl<H: RestreamHandler> MountPointRegistry<H> {
    /// Create a registry with application callbacks
    pub fn with_handler(
        config: MountConfig,
        handler: H,
        mounts: Arc<dyn MountTable>,
    ) -> Arc<Self> {
        Arc::new(Self {
            tables: Mutex::new(Tables {
                paths: HashMap::new(),
                sessions: ClientSessionTracker::new(),
            }),
            mounts,
            handler,
            factory: EndpointFactoryPair::new(config.channel_capacity),
            config,
            counters: RegistryCounters::new(),
        })
    }

    /// Get the registry configuration
    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Path resolution hook for the RTSP engine
    ///
    /// Same as [`resolve_path`](Self::resolve_path) with every rejection
    /// collapsed to `None`, which the engine reports as "not found".
    pub fn make_path(self: &Arc<Self>, ctx: &RequestContext, url: &RequestUrl) -> Option<String> {
        self.resolve_path(ctx, url).ok()
    }

    /// Resolve a request to the mount path serving it
    ///
    /// Mounts the path's endpoint pair on first use and records that the
    /// requesting client references it. Returns `abspath` for players and
    /// `abspath?record` for publishers.
    pub fn resolve_path(
        self: &Arc<Self>,
        ctx: &RequestContext,
        url: &RequestUrl,
    ) -> Result<String, ResolveError> {
        let client = ctx.client;
        let path = url.abspath.as_str();
        let role = url.role();

        if !AuthorizationGate::new(&self.handler).check_role(ctx.user(), role, path) {
            tracing::info!(
                client = %client,
                path = %path,
                role = %role,
                "Access denied"
            );
            return Err(self.reject(ResolveError::AuthorizationDenied));
        }

        tracing::debug!(client = %client, path = %path, role = %role, "make_path");

        let mut tables = self.tables.lock();
        let Tables { paths, sessions } = &mut *tables;

        let existing_refs = paths.get(path).map(PathEntry::refs);

        if let Some(limit) = self.config.path_limit() {
            if existing_refs.is_none() && paths.len() >= limit {
                tracing::info!(
                    client = %client,
                    path = %path,
                    count = limit,
                    "Max paths count reached"
                );
                return Err(self.reject(ResolveError::CapacityExceeded(CapacityLimit::Paths)));
            }
        }

        if let (Some(limit), Some(refs)) = (self.config.clients_per_path_limit(), existing_refs) {
            if refs as usize >= limit && !sessions.holds(client, path) {
                tracing::info!(
                    client = %client,
                    path = %path,
                    count = limit,
                    "Max clients count per path reached"
                );
                return Err(self.reject(ResolveError::CapacityExceeded(
                    CapacityLimit::ClientsPerPath,
                )));
            }
        }

        let new_client = sessions.track(client);
        if new_client {
            tracing::debug!(client = %client, path = %path, "Path request from new client");
        } else {
            tracing::debug!(client = %client, path = %path, "Client requesting path");
        }

        let added = sessions.hold(client, path);

        let created = match existing_refs {
            None => {
                if !added {
                    tracing::error!(
                        client = %client,
                        path = %path,
                        "Inconsistent data in mount points reference counting: held path not mounted"
                    );
                    self.counters.record_inconsistency();
                }
                self.create_mount(paths, client, path);
                true
            }
            Some(refs) if !added => {
                tracing::debug!(client = %client, path = %path, refs = refs, "Path already held");
                false
            }
            Some(_) => {
                if let Some(entry) = paths.get_mut(path) {
                    entry.refs += 1;
                    tracing::debug!(
                        client = %client,
                        path = %path,
                        refs = entry.refs,
                        "Path ref count increased"
                    );
                }
                false
            }
        };

        drop(tables);

        // Outside the lock: the engine may fire the callback right away
        if new_client {
            self.watch_client(client);
        }
        if created {
            self.handler.on_mount_created(path);
        }

        self.counters.record_resolved();

        Ok(canonical_path(path, role))
    }

    /// Process the disconnect of `client`
    ///
    /// Drops one reference from every path the client held and unmounts the
    /// paths nobody references any more. Expected exactly once per
    /// connection; later calls for the same client are no-ops.
    pub fn client_closed(&self, client: ClientId) {
        let mut removed = Vec::new();

        {
            let mut tables = self.tables.lock();
            let Tables { paths, sessions } = &mut *tables;

            sessions.on_disconnect(client, |path| {
                if self.release_path(paths, client, path) {
                    removed.push(path.to_owned());
                }
            });
        }

        for path in &removed {
            self.handler.on_mount_removed(path);
        }
    }

    /// Unmount every path and forget every client
    pub fn shutdown(&self) {
        let removed: Vec<String> = {
            let mut tables = self.tables.lock();
            tables.sessions.clear();

            let drained: Vec<(String, PathEntry)> = tables.paths.drain().collect();
            drained
                .into_iter()
                .map(|(path, entry)| {
                    self.unmount_pair(&path);
                    tracing::debug!(
                        path = %path,
                        refs = entry.refs,
                        "Mount point removed on shutdown"
                    );
                    path
                })
                .collect()
        };

        tracing::info!(paths = removed.len(), "Mount point registry shut down");

        for path in &removed {
            self.handler.on_mount_removed(path);
        }
    }

    /// Number of clients referencing `path`, `None` if it is not mounted
    pub fn ref_count(&self, path: &str) -> Option<u32> {
        self.tables.lock().paths.get(path).map(PathEntry::refs)
    }

    pub fn is_mounted(&self, path: &str) -> bool {
        self.tables.lock().paths.contains_key(path)
    }

    /// Number of distinct mounted paths
    pub fn path_count(&self) -> usize {
        self.tables.lock().paths.len()
    }

    /// Number of clients holding at least one path
    pub fn client_count(&self) -> usize {
        self.tables.lock().sessions.len()
    }

    /// Paths `client` currently holds, sorted
    pub fn held_paths(&self, client: ClientId) -> Vec<String> {
        self.tables.lock().sessions.held_paths(client)
    }

    /// Channel backing the endpoints of `path`
    pub fn channel_name(&self, path: &str) -> Option<ChannelName> {
        self.tables
            .lock()
            .paths
            .get(path)
            .map(|entry| entry.channel().clone())
    }

    /// Endpoint pair mounted for `path`
    pub fn endpoints(&self, path: &str) -> Option<EndpointPair> {
        self.tables
            .lock()
            .paths
            .get(path)
            .map(|entry| entry.endpoints.clone())
    }

    /// Get registry statistics
    pub fn stats(&self) -> RegistryStats {
        let tables = self.tables.lock();

        let mut paths: Vec<PathStats> = tables
            .paths
            .iter()
            .map(|(path, entry)| PathStats {
                path: path.clone(),
                refs: entry.refs,
                channel: entry.channel().clone(),
                has_publisher: entry.endpoints.publish.is_fed(),
                age: entry.age(),
            })
            .collect();
        paths.sort_by(|a, b| a.path.cmp(&b.path));

        RegistryStats {
            client_count: tables.sessions.len(),
            paths,
            counters: self.counters.snapshot(),
        }
    }

    fn reject(&self, error: ResolveError) -> ResolveError {
        self.counters.record_rejection(&error);
        error
    }

    fn watch_client(self: &Arc<Self>, client: ClientId) {
        let registry = Arc::downgrade(self);

        self.mounts.watch_disconnect(
            client,
            Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.client_closed(client);
                }
            }),
        );
    }

    fn create_mount(
        self: &Arc<Self>,
        paths: &mut HashMap<String, PathEntry>,
        client: ClientId,
        path: &str,
    ) {
        let channel = ChannelName::next();

        tracing::debug!(
            client = %client,
            path = %path,
            channel = %channel,
            "Creating mount point"
        );

        let pair = self.factory.create_observed(
            channel,
            &self.config.fallback_source,
            self.recorder_hook(path),
        );

        self.mounts
            .mount(path, Endpoint::Play(Arc::clone(&pair.subscribe)));
        self.mounts
            .mount(&record_path(path), Endpoint::Record(Arc::clone(&pair.publish)));

        if let Some(previous) = paths.insert(path.to_owned(), PathEntry::new(pair)) {
            tracing::error!(
                path = %path,
                channel = %previous.channel(),
                "Inconsistent data in mount points reference counting: path mounted twice"
            );
            self.counters.record_inconsistency();
        }

        self.counters.record_mount_created();
    }

    /// Relay publisher changes on `path` to the handler
    fn recorder_hook(self: &Arc<Self>, path: &str) -> FeedHook {
        let registry = Arc::downgrade(self);
        let path = path.to_owned();

        Arc::new(move |event| {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            match event {
                FeedEvent::Started => {
                    tracing::info!(path = %path, "Recorder connected");
                    registry.handler.on_recorder_connected(&path);
                }
                FeedEvent::Stopped => {
                    tracing::info!(path = %path, "Recorder disconnected");
                    registry.handler.on_recorder_disconnected(&path);
                }
            }
        })
    }

    /// Drop one reference from `path`
    ///
    /// Returns `true` if this was the last reference and the path was unmounted.
    fn release_path(
        &self,
        paths: &mut HashMap<String, PathEntry>,
        client: ClientId,
        path: &str,
    ) -> bool {
        let Some(entry) = paths.get_mut(path) else {
            tracing::error!(
                client = %client,
                path = %path,
                "Inconsistent data in mount points reference counting"
            );
            self.counters.record_inconsistency();
            return false;
        };

        if entry.refs == 0 {
            tracing::error!(
                client = %client,
                path = %path,
                "Inconsistent data in mount points reference counting: ref count already zero"
            );
            self.counters.record_inconsistency();
        } else {
            entry.refs -= 1;
        }

        if entry.refs > 0 {
            tracing::debug!(
                client = %client,
                path = %path,
                refs = entry.refs,
                "Path ref count decreased"
            );
            return false;
        }

        tracing::debug!(
            client = %client,
            path = %path,
            "Removing unused mount point"
        );

        paths.remove(path);
        self.unmount_pair(path);
        true
    }

    fn unmount_pair(&self, path: &str) {
        self.mounts.unmount(path);
        self.mounts.unmount(&record_path(path));
        self.counters.record_mount_removed();
    }
}

impl<H: RestreamHandler> std::fmt::Debug for MountPointRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.lock();
        f.debug_struct("MountPointRegistry")
            .field("paths", &tables.paths.len())
            .field("clients", &tables.sessions.len())
            .field("config", &self.config)
            .finish()
    }
}
