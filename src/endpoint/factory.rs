//! Publish/subscribe endpoint pairs
//!
//! A mount point is backed by two endpoints sharing one channel: the record
//! endpoint, mounted at `<path>?record`, takes the incoming stream and the
//! play endpoint, mounted at `<path>`, serves it back out. While nobody
//! publishes, players are pointed at a fallback source instead.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::broadcast;

use super::channel::{Channel, ChannelFeed, ChannelName, FeedHook};
use super::EndpointError;

/// Locator of the placeholder stream served while a channel has no publisher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocator(String);

impl SourceLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a player gets when it opens a play endpoint
#[derive(Debug)]
pub enum PlaySource {
    /// Live packets from the current publisher
    Live(broadcast::Receiver<Bytes>),
    /// No publisher; play the placeholder instead
    Fallback(SourceLocator),
}

/// Subscribe side of a mount point
#[derive(Debug)]
pub struct PlayEndpoint {
    channel: Arc<Channel>,
    fallback: SourceLocator,
}

impl PlayEndpoint {
    pub fn channel_name(&self) -> &ChannelName {
        self.channel.name()
    }

    pub fn fallback(&self) -> &SourceLocator {
        &self.fallback
    }

    /// Open the endpoint for one player
    pub fn open(&self) -> PlaySource {
        if self.channel.is_fed() {
            PlaySource::Live(self.channel.subscribe())
        } else {
            PlaySource::Fallback(self.fallback.clone())
        }
    }
}

/// Publish side of a mount point
#[derive(Debug)]
pub struct RecordEndpoint {
    channel: Arc<Channel>,
}

impl RecordEndpoint {
    pub fn channel_name(&self) -> &ChannelName {
        self.channel.name()
    }

    /// Start feeding the channel
    ///
    /// Fails with [`EndpointError::ChannelBusy`] while another publisher feeds it.
    pub fn begin_feed(&self) -> Result<ChannelFeed, EndpointError> {
        self.channel.begin_feed()
    }

    pub fn is_fed(&self) -> bool {
        self.channel.is_fed()
    }
}

/// The two endpoints backing one mount point
#[derive(Debug, Clone)]
pub struct EndpointPair {
    pub channel: ChannelName,
    pub publish: Arc<RecordEndpoint>,
    pub subscribe: Arc<PlayEndpoint>,
}

/// Builds endpoint pairs bound to a fresh channel
#[derive(Debug, Clone)]
pub struct EndpointFactoryPair {
    channel_capacity: usize,
}

impl EndpointFactoryPair {
    pub fn new(channel_capacity: usize) -> Self {
        Self { channel_capacity }
    }

    /// Create a record/play pair sharing the channel `name`
    pub fn create(&self, name: ChannelName, fallback: &SourceLocator) -> EndpointPair {
        self.build(name, fallback, None)
    }

    /// Like [`create`](Self::create), reporting publisher changes to `hook`
    pub fn create_observed(
        &self,
        name: ChannelName,
        fallback: &SourceLocator,
        hook: FeedHook,
    ) -> EndpointPair {
        self.build(name, fallback, Some(hook))
    }

    fn build(
        &self,
        name: ChannelName,
        fallback: &SourceLocator,
        hook: Option<FeedHook>,
    ) -> EndpointPair {
        let channel = Channel::with_hook(name.clone(), self.channel_capacity, hook);

        tracing::debug!(channel = %name, fallback = %fallback, "Endpoint pair created");

        EndpointPair {
            channel: name,
            publish: Arc::new(RecordEndpoint {
                channel: Arc::clone(&channel),
            }),
            subscribe: Arc::new(PlayEndpoint {
                channel,
                fallback: fallback.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> EndpointPair {
        EndpointFactoryPair::new(16).create(
            ChannelName::next(),
            &SourceLocator::new("rtsp://localhost:8000/blue"),
        )
    }

    #[test]
    fn test_pair_shares_channel() {
        let pair = pair();

        assert_eq!(pair.publish.channel_name(), &pair.channel);
        assert_eq!(pair.subscribe.channel_name(), &pair.channel);
        assert_eq!(pair.subscribe.fallback().as_str(), "rtsp://localhost:8000/blue");
    }

    #[test]
    fn test_observed_pair_reports_publisher() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        use crate::endpoint::FeedEvent;

        let started = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&started);
        let pair = EndpointFactoryPair::new(4).create_observed(
            ChannelName::next(),
            &SourceLocator::new("rtsp://localhost:8000/blue"),
            Arc::new(move |event| {
                if event == FeedEvent::Started {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );

        let _feed = pair.publish.begin_feed().unwrap();
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_play_falls_back_without_publisher() {
        let pair = pair();

        match pair.subscribe.open() {
            PlaySource::Fallback(locator) => {
                assert_eq!(locator.as_str(), "rtsp://localhost:8000/blue")
            }
            PlaySource::Live(_) => panic!("expected fallback source"),
        }
    }

    #[tokio::test]
    async fn test_play_goes_live_while_fed() {
        let pair = pair();
        let feed = pair.publish.begin_feed().unwrap();
        assert!(pair.publish.is_fed());

        let mut rx = match pair.subscribe.open() {
            PlaySource::Live(rx) => rx,
            PlaySource::Fallback(_) => panic!("expected live source"),
        };

        feed.push(Bytes::from_static(b"frame"));
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"frame"));

        // Publisher leaves: new players get the placeholder again
        drop(feed);
        assert!(matches!(pair.subscribe.open(), PlaySource::Fallback(_)));
    }

    #[test]
    fn test_second_publisher_rejected() {
        let pair = pair();
        let _feed = pair.publish.begin_feed().unwrap();

        assert!(matches!(
            pair.publish.begin_feed(),
            Err(EndpointError::ChannelBusy(_))
        ));
    }

    #[test]
    fn test_fresh_pairs_get_distinct_channels() {
        let a = pair();
        let b = pair();

        assert_ne!(a.channel, b.channel);
    }
}
