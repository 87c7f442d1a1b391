//! Path entry types
//!
//! This module defines the per-path state stored in the registry.

use std::time::{Duration, Instant};

use crate::endpoint::{ChannelName, EndpointPair};

/// Entry for a single mounted path
#[derive(Debug)]
pub struct PathEntry {
    /// Number of distinct clients referencing the path
    pub(super) refs: u32,

    /// Endpoints mounted for the path
    pub endpoints: EndpointPair,

    /// When the mount point was created
    pub created_at: Instant,
}

impl PathEntry {
    pub(super) fn new(endpoints: EndpointPair) -> Self {
        Self {
            refs: 1,
            endpoints,
            created_at: Instant::now(),
        }
    }

    pub fn refs(&self) -> u32 {
        self.refs
    }

    pub fn channel(&self) -> &ChannelName {
        &self.endpoints.channel
    }

    /// Time since the mount point was created
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// Snapshot of one mounted path
#[derive(Debug, Clone)]
pub struct PathStats {
    /// Mounted path
    pub path: String,
    /// Number of clients referencing it
    pub refs: u32,
    /// Channel backing its endpoints
    pub channel: ChannelName,
    /// Whether a publisher currently feeds the channel
    pub has_publisher: bool,
    /// Time since the mount point was created
    pub age: Duration,
}
