//! Startup orchestration.
//!
//! # Responsibilities
//! - Render the startup banner and resolved settings
//! - Build the validator from config
//! - Bind the HTTP and stats listeners and spawn their servers
//!
//! # Design Decisions
//! - Fail fast: both listeners bind before either server is spawned
//! - HTTP binds first; the stats listener is optional

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::JsonpdConfig;
use crate::http::HttpServer;
use crate::jsonp::CallbackValidator;
use crate::lifecycle::Shutdown;
use crate::stats::{OutcomeCounters, StatsServer};

const ART: &str = r"
     _ ____   ___  _   _ ____  ____
    | / ___| / _ \| \ | |  _ \|  _ \
 _  | \___ \| | | |  \| | |_) | | | |
| |_| |___) | |_| | |\  |  __/| |_| |
 \___/|____/ \___/|_| \_|_|   |____/
";

/// Error raised before the servers start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid callback pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to bind {name} listener on {address}: {source}")]
    Bind {
        name: &'static str,
        address: String,
        #[source]
        source: io::Error,
    },
}

/// Banner plus the resolved settings, as printed on startup.
pub fn banner(config: &JsonpdConfig) -> String {
    let info = if config.stats.enabled {
        config.stats.bind_address.as_str()
    } else {
        "disabled"
    };
    format!(
        "{}\nprocs: {}\nbind: {}\ninfo: {}\ncallback: {}\ntimeout: {:?}\n",
        ART,
        config.listener.workers,
        config.listener.bind_address,
        info,
        config.jsonp.callback_param,
        config.listener.timeout(),
    )
}

/// Running servers and the addresses they are bound to.
pub struct Services {
    pub http_addr: SocketAddr,
    pub stats_addr: Option<SocketAddr>,
    http: JoinHandle<Result<(), io::Error>>,
    stats: Option<JoinHandle<()>>,
}

impl Services {
    /// Wait for both servers to stop. Returns early if the HTTP server fails.
    pub async fn join(self) -> Result<(), io::Error> {
        self.http.await.map_err(io::Error::other)??;
        if let Some(stats) = self.stats {
            stats.await.map_err(io::Error::other)?;
        }
        Ok(())
    }
}

async fn bind_listener(name: &'static str, address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            name,
            address: address.to_string(),
            source,
        })
}

fn local_addr(name: &'static str, address: &str, listener: &TcpListener) -> Result<SocketAddr, StartupError> {
    listener.local_addr().map_err(|source| StartupError::Bind {
        name,
        address: address.to_string(),
        source,
    })
}

/// Bind every configured listener and spawn its server.
pub async fn bind(
    config: JsonpdConfig,
    counters: Arc<OutcomeCounters>,
    shutdown: &Shutdown,
) -> Result<Services, StartupError> {
    let validator = CallbackValidator::new(config.jsonp.max_callback_len)?;

    let http_listener = bind_listener("http", &config.listener.bind_address).await?;
    let http_addr = local_addr("http", &config.listener.bind_address, &http_listener)?;

    let stats_listener = if config.stats.enabled {
        let listener = bind_listener("stats", &config.stats.bind_address).await?;
        let addr = local_addr("stats", &config.stats.bind_address, &listener)?;
        Some((listener, addr))
    } else {
        None
    };

    let (stats, stats_addr) = match stats_listener {
        Some((listener, addr)) => {
            let server = StatsServer::new(counters.clone(), config.listener.timeout());
            let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));
            (Some(handle), Some(addr))
        }
        None => (None, None),
    };

    let server = HttpServer::new(config, validator, counters);
    let http = tokio::spawn(server.run(http_listener, shutdown.subscribe()));

    Ok(Services {
        http_addr,
        stats_addr,
        http,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_lists_settings() {
        let mut config = JsonpdConfig::default();
        config.listener.workers = 4;
        let text = banner(&config);

        assert!(text.contains("procs: 4\n"));
        assert!(text.contains("bind: localhost:8000\n"));
        assert!(text.contains("info: localhost:8001\n"));
        assert!(text.contains("callback: callback\n"));
        assert!(text.contains("timeout: 500ms\n"));

        config.stats.enabled = false;
        assert!(banner(&config).contains("info: disabled\n"));
    }

    #[tokio::test]
    async fn test_bind_conflict_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = JsonpdConfig::default();
        config.listener.bind_address = taken.local_addr().unwrap().to_string();
        config.stats.enabled = false;

        let shutdown = Shutdown::new();
        let err = bind(config, Arc::new(OutcomeCounters::new()), &shutdown)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StartupError::Bind { name: "http", .. }));
    }
}
