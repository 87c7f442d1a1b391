//! Endpoints backing a mount point
//!
//! Each logical path is served by a pair of endpoints bound to one named
//! channel: a record endpoint that accepts the published stream and a play
//! endpoint that hands it to players.
//!
//! ```text
//!   /cam1?record                          /cam1
//!  [RecordEndpoint] ──► Channel "channelN" ──► [PlayEndpoint] ──► players
//!                                               │
//!                                               └─ no publisher: fallback source
//! ```

pub mod channel;
pub mod factory;

pub use channel::{Channel, ChannelFeed, ChannelName, FeedEvent, FeedHook};
pub use factory::{
    EndpointFactoryPair, EndpointPair, PlayEndpoint, PlaySource, RecordEndpoint, SourceLocator,
};

/// Error type for endpoint operations
#[derive(Debug, Clone)]
pub enum EndpointError {
    /// The channel already has a publisher
    ChannelBusy(ChannelName),
}

impl std::fmt::Display for EndpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointError::ChannelBusy(name) => {
                write!(f, "Channel already has a publisher: {}", name)
            }
        }
    }
}

impl std::error::Error for EndpointError {}
