//! Integration with the RTSP engine
//!
//! Configuration values, application callbacks and the mount table boundary
//! the registry drives.

pub mod config;
pub mod handler;
pub mod mounts;

pub use config::MountConfig;
pub use handler::{AllowAll, RestreamHandler};
pub use mounts::{DisconnectCallback, Endpoint, InMemoryMounts, MountTable};
