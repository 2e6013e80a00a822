//! Plaintext stats listener.
//!
//! Accepts one connection at a time, writes a counter snapshot and closes.
//! Shares nothing with the request path except atomic counter reads.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use super::counters::OutcomeCounters;

/// Serves counter snapshots over raw TCP.
pub struct StatsServer {
    counters: Arc<OutcomeCounters>,
    write_timeout: Duration,
}

impl StatsServer {
    pub fn new(counters: Arc<OutcomeCounters>, write_timeout: Duration) -> Self {
        Self {
            counters,
            write_timeout,
        }
    }

    /// Run the accept loop until a shutdown signal arrives.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, "Stats listener starting");
        }

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            tracing::debug!(peer_addr = %peer, "Stats connection accepted");
                            self.serve(stream).await;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Stats accept failed");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Stats listener received shutdown signal");
                    break;
                }
            }
        }

        tracing::info!("Stats listener stopped");
    }

    async fn serve(&self, mut stream: TcpStream) {
        let body = self.counters.snapshot().to_string();
        let write = async {
            stream.write_all(body.as_bytes()).await?;
            stream.shutdown().await
        };

        match tokio::time::timeout(self.write_timeout, write).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!(error = %e, "Stats write failed"),
            Err(_) => tracing::debug!(timeout = ?self.write_timeout, "Stats write timed out"),
        }
    }
}
