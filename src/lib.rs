//! restream-rs: mount point registry for a live RTSP restreaming server
//!
//! Clients publish a stream to a path (`rtsp://host/cam1?record`) and other
//! clients play it back from the same path (`rtsp://host/cam1`). This crate
//! provides the piece between the RTSP engine and the media:
//! - Admission of path requests (authorization and capacity limits)
//! - Lazy creation of a publish/subscribe endpoint pair per path
//! - Per-client reference counting and teardown on disconnect
//! - A placeholder source for players while nobody publishes
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use restream_rs::registry::RequestUrl;
//! use restream_rs::session::{ClientId, RequestContext};
//! use restream_rs::{InMemoryMounts, MountConfig, MountPointRegistry};
//!
//! let mounts = Arc::new(InMemoryMounts::new());
//! let registry = MountPointRegistry::new(MountConfig::default(), mounts.clone());
//!
//! let player = RequestContext::new(ClientId(1));
//! let path = registry.make_path(&player, &RequestUrl::parse("/cam1"));
//! assert_eq!(path.as_deref(), Some("/cam1"));
//!
//! let camera = RequestContext::new(ClientId(2));
//! let path = registry.make_path(&camera, &RequestUrl::parse("/cam1?record"));
//! assert_eq!(path.as_deref(), Some("/cam1?record"));
//! assert_eq!(registry.ref_count("/cam1"), Some(2));
//!
//! mounts.close_client(ClientId(1));
//! mounts.close_client(ClientId(2));
//! assert!(!registry.is_mounted("/cam1"));
//! ```

pub mod auth;
pub mod endpoint;
pub mod error;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

// Re-export main types for convenience
pub use error::Error;
pub use registry::{MountPointRegistry, ResolveError, Role};
pub use server::config::MountConfig;
pub use server::handler::{AllowAll, RestreamHandler};
pub use server::mounts::{Endpoint, InMemoryMounts, MountTable};
