//! Restream mount point walkthrough
//!
//! Run with: cargo run --example restream_server
//!
//! Drives the mount point registry the way the RTSP engine would:
//!
//! 1. A player asks for `/cam1` before anyone publishes and gets the
//!    placeholder source
//! 2. A camera publishes to `/cam1?record`
//! 3. A second player joins and receives the live packets
//! 4. Everyone disconnects and the mount point disappears
//!
//! Set `RUST_LOG=restream_rs=debug` for the registry's bookkeeping logs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use restream_rs::endpoint::PlaySource;
use restream_rs::registry::{RequestUrl, Role};
use restream_rs::server::config::RESTREAM_SERVER_PORT;
use restream_rs::session::{ClientId, RequestContext};
use restream_rs::{Endpoint, InMemoryMounts, MountConfig, MountPointRegistry, RestreamHandler};

/// Handler that only lets the "camera" user publish
struct DemoHandler {
    mounts_created: AtomicU64,
    mounts_removed: AtomicU64,
}

impl RestreamHandler for DemoHandler {
    fn authorize_role(&self, user: Option<&str>, role: Role, path: &str) -> bool {
        let allowed = role == Role::Subscribe || user == Some("camera");
        if !allowed {
            println!("Refusing {} on {} for {:?}", role, path, user);
        }
        allowed
    }

    fn on_mount_created(&self, path: &str) {
        self.mounts_created.fetch_add(1, Ordering::Relaxed);
        println!("Mount point created: {}", path);
    }

    fn on_mount_removed(&self, path: &str) {
        self.mounts_removed.fetch_add(1, Ordering::Relaxed);
        println!("Mount point removed: {}", path);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("restream_rs=info".parse()?)
                .add_directive("restream_server=info".parse()?),
        )
        .init();

    let mounts = Arc::new(InMemoryMounts::new());
    let handler = DemoHandler {
        mounts_created: AtomicU64::new(0),
        mounts_removed: AtomicU64::new(0),
    };
    let registry = MountPointRegistry::with_handler(
        MountConfig::default().max_paths(8).max_clients_per_path(16),
        handler,
        mounts.clone(),
    );

    let base = format!("rtsp://localhost:{}", RESTREAM_SERVER_PORT);

    // Early player: nobody publishes yet
    let early = RequestContext::new(ClientId(1));
    let play_path = registry
        .make_path(&early, &RequestUrl::parse("/cam1"))
        .ok_or("play request rejected")?;
    println!("Player 1 -> {}{}", base, play_path);

    let Some(Endpoint::Play(play)) = mounts.lookup(&play_path) else {
        return Err("play endpoint not mounted".into());
    };
    if let PlaySource::Fallback(locator) = play.open() {
        println!("Player 1 gets placeholder {}", locator);
    }

    // Anonymous publish attempt is refused
    let intruder = RequestContext::new(ClientId(2));
    let refused = registry.resolve_path(&intruder, &RequestUrl::parse("/cam1?record"));
    println!("Anonymous publish: {:?}", refused);

    // Camera publishes
    let camera = RequestContext::new(ClientId(3)).with_user("camera");
    let record_path = registry.resolve_path(&camera, &RequestUrl::parse("/cam1?record"))?;
    println!("Camera -> {}{}", base, record_path);

    let Some(Endpoint::Record(record)) = mounts.lookup(&record_path) else {
        return Err("record endpoint not mounted".into());
    };
    let feed = record.begin_feed().map_err(restream_rs::Error::from)?;

    // Late player attaches to the live channel
    let late = RequestContext::new(ClientId(4));
    registry.resolve_path(&late, &RequestUrl::parse("/cam1"))?;
    let mut rx = match play.open() {
        PlaySource::Live(rx) => rx,
        PlaySource::Fallback(_) => return Err("expected live source".into()),
    };

    let player = tokio::spawn(async move {
        let mut received = 0usize;
        while let Ok(packet) = rx.recv().await {
            received += packet.len();
            if received >= 3 * 188 {
                break;
            }
        }
        received
    });

    for seq in 0..3u8 {
        feed.push(Bytes::from(vec![seq; 188]));
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    println!("Player 4 received {} bytes", player.await?);

    let stats = registry.stats();
    println!(
        "Stats: paths={} clients={} refs={} published={} rejected={}",
        stats.path_count(),
        stats.client_count,
        stats.total_refs(),
        stats.published_paths(),
        stats.counters.rejected(),
    );

    // Disconnects arrive from the engine
    drop(feed);
    for client in [1, 3, 4] {
        mounts.close_client(ClientId(client));
        println!(
            "Client {} left, /cam1 refs: {:?}",
            client,
            registry.ref_count("/cam1")
        );
    }

    let handler = registry.handler();
    println!(
        "Mount points created={} removed={}",
        handler.mounts_created.load(Ordering::Relaxed),
        handler.mounts_removed.load(Ordering::Relaxed),
    );

    registry.shutdown();

    Ok(())
}
