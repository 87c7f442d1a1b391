//! Client sessions
//!
//! Client identity as seen by the mount point registry and the per-client
//! bookkeeping of which paths each connection holds.

pub mod context;
pub mod tracker;

pub use context::{ClientId, RequestContext};
pub use tracker::{ClientSession, ClientSessionTracker};
