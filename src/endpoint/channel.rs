//! Named channels bridging a publish endpoint to a subscribe endpoint
//!
//! Every mount point owns exactly one channel. The publisher side pushes
//! opaque packets into it and every player attached to the subscribe side
//! receives them through a `tokio::sync::broadcast` receiver.
//!
//! Channel names come from a process-wide counter and are never handed out
//! twice. A player may still hold a channel after its mount point has been
//! torn down, so a recreated path must never bind to the old name.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::broadcast;

use super::EndpointError;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(0);

/// Publisher lifecycle event on a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEvent {
    /// A publisher claimed the channel
    Started,
    /// The publisher released the channel
    Stopped,
}

/// Callback fired on every [`FeedEvent`] of a channel
pub type FeedHook = Arc<dyn Fn(FeedEvent) + Send + Sync>;

/// Unique name of an internal channel (`channel0`, `channel1`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelName(u64);

impl ChannelName {
    /// Allocate the next unused channel name
    pub fn next() -> Self {
        Self(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric id behind the name
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChannelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "channel{}", self.0)
    }
}

/// In-process conduit shared by one publish and one subscribe endpoint
pub struct Channel {
    name: ChannelName,
    tx: broadcast::Sender<Bytes>,
    feeding: AtomicBool,
    hook: Option<FeedHook>,
}

impl Channel {
    /// Create a channel with the given broadcast buffer depth
    pub fn new(name: ChannelName, capacity: usize) -> Arc<Self> {
        Self::with_hook(name, capacity, None)
    }

    /// Create a channel that reports publisher changes to `hook`
    pub fn with_hook(name: ChannelName, capacity: usize, hook: Option<FeedHook>) -> Arc<Self> {
        let (tx, _) = broadcast::channel(capacity.max(1));

        Arc::new(Self {
            name,
            tx,
            feeding: AtomicBool::new(false),
            hook,
        })
    }

    pub fn name(&self) -> &ChannelName {
        &self.name
    }

    /// Whether a publisher currently feeds this channel
    pub fn is_fed(&self) -> bool {
        self.feeding.load(Ordering::Acquire)
    }

    /// Number of players attached to the live side
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub(super) fn subscribe(&self) -> broadcast::Receiver<Bytes> {
        self.tx.subscribe()
    }

    /// Claim the publisher slot
    pub(super) fn begin_feed(self: &Arc<Self>) -> Result<ChannelFeed, EndpointError> {
        if self
            .feeding
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(EndpointError::ChannelBusy(self.name.clone()));
        }

        tracing::debug!(channel = %self.name, "Channel feed started");
        self.notify(FeedEvent::Started);

        Ok(ChannelFeed {
            channel: Arc::clone(self),
        })
    }

    fn notify(&self, event: FeedEvent) {
        if let Some(hook) = &self.hook {
            hook(event);
        }
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("fed", &self.is_fed())
            .field("receivers", &self.receiver_count())
            .finish()
    }
}

/// Publisher handle for a channel
///
/// The channel counts as fed for as long as this value is alive.
#[derive(Debug)]
pub struct ChannelFeed {
    channel: Arc<Channel>,
}

impl ChannelFeed {
    /// Push a packet to every attached player
    ///
    /// Returns the number of players that received it, 0 when nobody listens.
    pub fn push(&self, packet: Bytes) -> usize {
        self.channel.tx.send(packet).unwrap_or(0)
    }

    pub fn channel_name(&self) -> &ChannelName {
        &self.channel.name
    }
}

impl Drop for ChannelFeed {
    fn drop(&mut self) {
        self.channel.feeding.store(false, Ordering::Release);
        tracing::debug!(channel = %self.channel.name, "Channel feed stopped");
        self.channel.notify(FeedEvent::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    #[test]
    fn test_names_are_never_reused() {
        let a = ChannelName::next();
        let b = ChannelName::next();
        let c = ChannelName::next();

        assert!(a.id() < b.id());
        assert!(b.id() < c.id());
        assert_eq!(format!("{}", a), format!("channel{}", a.id()));
    }

    #[test]
    fn test_single_feed_at_a_time() {
        let channel = Channel::new(ChannelName::next(), 16);
        assert!(!channel.is_fed());

        let feed = assert_ok!(channel.begin_feed());
        assert!(channel.is_fed());

        let busy = assert_err!(channel.begin_feed());
        assert!(matches!(busy, EndpointError::ChannelBusy(_)));

        drop(feed);
        assert!(!channel.is_fed());
        assert_ok!(channel.begin_feed());
    }

    #[tokio::test]
    async fn test_feed_reaches_receivers() {
        let channel = Channel::new(ChannelName::next(), 16);
        let mut rx1 = channel.subscribe();
        let mut rx2 = channel.subscribe();
        assert_eq!(channel.receiver_count(), 2);

        let feed = channel.begin_feed().unwrap();
        assert_eq!(feed.push(Bytes::from_static(b"\x00\x01")), 2);

        assert_eq!(rx1.recv().await.unwrap(), Bytes::from_static(b"\x00\x01"));
        assert_eq!(rx2.recv().await.unwrap(), Bytes::from_static(b"\x00\x01"));
    }

    #[test]
    fn test_hook_sees_feed_lifecycle() {
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let hook: FeedHook = Arc::new(move |event| sink.lock().push(event));
        let channel = Channel::with_hook(ChannelName::next(), 4, Some(hook));

        let feed = channel.begin_feed().unwrap();
        // Refused claims are not reported
        assert!(channel.begin_feed().is_err());
        drop(feed);

        assert_eq!(*events.lock(), vec![FeedEvent::Started, FeedEvent::Stopped]);
    }

    #[test]
    fn test_push_without_receivers() {
        let channel = Channel::new(ChannelName::next(), 4);
        let feed = channel.begin_feed().unwrap();

        assert_eq!(feed.push(Bytes::from_static(b"x")), 0);
    }
}
