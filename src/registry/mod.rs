//! Mount point registry
//!
//! The registry turns path requests from the RTSP engine into mount points.
//! Each logical path gets one endpoint pair, mounted on first use and
//! unmounted when the last client referencing it disconnects.
//!
//! # Architecture
//!
//! ```text
//!                      Arc<MountPointRegistry>
//!                 ┌──────────────────────────────┐
//!                 │ Mutex<Tables {               │
//!                 │   paths:    path -> PathEntry│
//!                 │             { refs, pair }   │
//!                 │   sessions: client -> paths  │
//!                 │ }>                           │
//!                 └──────┬───────────────▲───────┘
//!                        │               │
//!          make_path()   │               │  client_closed()
//!                        ▼               │
//!                 ┌──────────────────────┴───────┐
//!                 │ MountTable (RTSP engine)     │
//!                 │  /cam1         -> Play       │
//!                 │  /cam1?record  -> Record     │
//!                 └──────────────────────────────┘
//! ```
//!
//! # Path lifecycle
//!
//! A path is either absent or mounted with `n >= 1` referencing clients.
//! A client counts once per path no matter how often, or in which role, it
//! asks for it. Only disconnects (or [`MountPointRegistry::shutdown`])
//! lower the count.

pub mod entry;
pub mod error;
pub mod path;
pub mod store;

pub use entry::{PathEntry, PathStats};
pub use error::{CapacityLimit, ResolveError};
pub use path::{canonical_path, record_path, RequestUrl, Role, RECORD_SUFFIX};
pub use store::MountPointRegistry;
