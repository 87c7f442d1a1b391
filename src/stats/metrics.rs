//! Statistics for the mount point registry

use std::sync::atomic::{AtomicU64, Ordering};

use crate::registry::entry::PathStats;
use crate::registry::error::{CapacityLimit, ResolveError};

/// Running counters, updated lock-free alongside the registry tables
#[derive(Debug, Default)]
pub struct RegistryCounters {
    resolved: AtomicU64,
    denied: AtomicU64,
    path_limit_hits: AtomicU64,
    client_limit_hits: AtomicU64,
    mounts_created: AtomicU64,
    mounts_removed: AtomicU64,
    inconsistencies: AtomicU64,
}

impl RegistryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_resolved(&self) {
        self.resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self, error: &ResolveError) {
        let counter = match error {
            ResolveError::AuthorizationDenied => &self.denied,
            ResolveError::CapacityExceeded(CapacityLimit::Paths) => &self.path_limit_hits,
            ResolveError::CapacityExceeded(CapacityLimit::ClientsPerPath) => {
                &self.client_limit_hits
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_mount_created(&self) {
        self.mounts_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_mount_removed(&self) {
        self.mounts_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_inconsistency(&self) {
        self.inconsistencies.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current values
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            resolved: self.resolved.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            path_limit_hits: self.path_limit_hits.load(Ordering::Relaxed),
            client_limit_hits: self.client_limit_hits.load(Ordering::Relaxed),
            mounts_created: self.mounts_created.load(Ordering::Relaxed),
            mounts_removed: self.mounts_removed.load(Ordering::Relaxed),
            inconsistencies: self.inconsistencies.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RegistryCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Successful path resolutions
    pub resolved: u64,
    /// Requests refused by the authorization gate
    pub denied: u64,
    /// Requests refused by the distinct path limit
    pub path_limit_hits: u64,
    /// Requests refused by the per-path client limit
    pub client_limit_hits: u64,
    /// Mount points created
    pub mounts_created: u64,
    /// Mount points removed
    pub mounts_removed: u64,
    /// Reference counting inconsistencies detected
    pub inconsistencies: u64,
}

impl CounterSnapshot {
    /// Total rejected requests
    pub fn rejected(&self) -> u64 {
        self.denied + self.path_limit_hits + self.client_limit_hits
    }

    /// Mount points currently alive according to the counters
    pub fn live_mounts(&self) -> u64 {
        self.mounts_created.saturating_sub(self.mounts_removed)
    }
}

/// Registry-wide statistics
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Tracked clients
    pub client_count: usize,
    /// Per-path details, sorted by path
    pub paths: Vec<PathStats>,
    /// Lifetime counters
    pub counters: CounterSnapshot,
}

impl RegistryStats {
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Sum of all path reference counts
    pub fn total_refs(&self) -> u64 {
        self.paths.iter().map(|p| u64::from(p.refs)).sum()
    }

    /// Paths with an active publisher
    pub fn published_paths(&self) -> usize {
        self.paths.iter().filter(|p| p.has_publisher).count()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::endpoint::ChannelName;

    #[test]
    fn test_counters_new() {
        let snapshot = RegistryCounters::new().snapshot();

        assert_eq!(snapshot, CounterSnapshot::default());
        assert_eq!(snapshot.rejected(), 0);
    }

    #[test]
    fn test_rejections_by_cause() {
        let counters = RegistryCounters::new();
        counters.record_rejection(&ResolveError::AuthorizationDenied);
        counters.record_rejection(&ResolveError::CapacityExceeded(CapacityLimit::Paths));
        counters.record_rejection(&ResolveError::CapacityExceeded(CapacityLimit::Paths));
        counters.record_rejection(&ResolveError::CapacityExceeded(
            CapacityLimit::ClientsPerPath,
        ));

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.denied, 1);
        assert_eq!(snapshot.path_limit_hits, 2);
        assert_eq!(snapshot.client_limit_hits, 1);
        assert_eq!(snapshot.rejected(), 4);
    }

    #[test]
    fn test_live_mounts() {
        let counters = RegistryCounters::new();
        counters.record_mount_created();
        counters.record_mount_created();
        counters.record_mount_removed();

        assert_eq!(counters.snapshot().live_mounts(), 1);
    }

    #[test]
    fn test_registry_stats_totals() {
        let stats = RegistryStats {
            client_count: 3,
            paths: vec![
                PathStats {
                    path: "/a".into(),
                    refs: 2,
                    channel: ChannelName::next(),
                    has_publisher: true,
                    age: Duration::ZERO,
                },
                PathStats {
                    path: "/b".into(),
                    refs: 1,
                    channel: ChannelName::next(),
                    has_publisher: false,
                    age: Duration::ZERO,
                },
            ],
            counters: CounterSnapshot::default(),
        };

        assert_eq!(stats.path_count(), 2);
        assert_eq!(stats.total_refs(), 3);
        assert_eq!(stats.published_paths(), 1);
    }
}
