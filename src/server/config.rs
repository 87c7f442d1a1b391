//! Mount point configuration

use crate::endpoint::SourceLocator;

/// Port of the static content server that hosts the placeholder streams
pub const STATIC_SERVER_PORT: u16 = 8000;

/// Port the restream server listens on
pub const RESTREAM_SERVER_PORT: u16 = 8001;

/// Default broadcast buffer depth of a channel, in packets
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Mount point registry configuration
#[derive(Debug, Clone)]
pub struct MountConfig {
    /// Maximum number of distinct mounted paths (0 = unlimited)
    pub max_paths: usize,

    /// Maximum number of clients referencing one path (0 = unlimited)
    pub max_clients_per_path: usize,

    /// Stream served to players while a path has no publisher
    pub fallback_source: SourceLocator,

    /// Broadcast buffer depth of each channel
    pub channel_capacity: usize,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            max_paths: 0,            // Unlimited
            max_clients_per_path: 0, // Unlimited
            fallback_source: SourceLocator::new(format!(
                "rtsp://localhost:{}/blue",
                STATIC_SERVER_PORT
            )),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl MountConfig {
    /// Set the maximum number of distinct paths
    pub fn max_paths(mut self, max: usize) -> Self {
        self.max_paths = max;
        self
    }

    /// Set the maximum number of clients per path
    pub fn max_clients_per_path(mut self, max: usize) -> Self {
        self.max_clients_per_path = max;
        self
    }

    /// Set the fallback source locator
    pub fn fallback_source(mut self, locator: impl Into<String>) -> Self {
        self.fallback_source = SourceLocator::new(locator);
        self
    }

    /// Set the channel buffer depth
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub(crate) fn path_limit(&self) -> Option<usize> {
        (self.max_paths > 0).then_some(self.max_paths)
    }

    pub(crate) fn clients_per_path_limit(&self) -> Option<usize> {
        (self.max_clients_per_path > 0).then_some(self.max_clients_per_path)
    }
}
