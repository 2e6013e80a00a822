//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use jsonpd::config::JsonpdConfig;
use jsonpd::lifecycle::{self, Services, Shutdown};
use jsonpd::stats::OutcomeCounters;

/// A running jsonpd on ephemeral localhost ports.
pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    pub stats_addr: Option<SocketAddr>,
    pub counters: Arc<OutcomeCounters>,
    shutdown: Shutdown,
    services: Services,
}

impl TestServer {
    /// Trigger shutdown and wait for both servers to exit.
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.services.join().await.unwrap();
    }
}

/// Start a server with defaults, adjusted by `configure`.
pub async fn start_server(configure: impl FnOnce(&mut JsonpdConfig)) -> TestServer {
    let mut config = JsonpdConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.stats.bind_address = "127.0.0.1:0".to_string();
    configure(&mut config);

    let counters = Arc::new(OutcomeCounters::new());
    let shutdown = Shutdown::new();
    let services = lifecycle::bind(config, counters.clone(), &shutdown)
        .await
        .expect("server failed to bind");

    TestServer {
        base_url: format!("http://{}", services.http_addr),
        stats_addr: services.stats_addr,
        counters,
        shutdown,
        services,
    }
}

/// Non-pooled client so `Connection: close` responses never poison a pool.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Read one snapshot from the stats listener.
#[allow(dead_code)]
pub async fn read_stats(addr: SocketAddr) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut text = String::new();
    stream.read_to_string(&mut text).await.unwrap();
    text
}
