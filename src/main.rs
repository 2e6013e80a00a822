//! jsonpd
//!
//! Answers any request carrying a JSONP callback with an ESI include of the
//! same URL, wrapped so that only an ESI-capable edge cache will ever turn it
//! into executable JavaScript.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                    JSONPD                     │
//!                      │                                               │
//!   GET /x?callback=f  │  ┌─────────┐   ┌───────────┐   ┌──────────┐  │
//!   ───────────────────┼─▶│  http   │──▶│  request  │──▶│ validator│  │
//!                      │  │ server  │   │ (query)   │   │ (jsonp)  │  │
//!                      │  └─────────┘   └───────────┘   └────┬─────┘  │
//!                      │                                     │        │
//!   200 ESI/JSONP      │  ┌──────────┐                       ▼        │
//!   or 400 page        │  │ response │◀──────────────  OutcomeSink    │
//!   ◀──────────────────┼──│ composer │                 (counters)     │
//!                      │  └──────────┘                       │        │
//!                      │                                     ▼        │
//!   nc host 8001       │  ┌──────────────────┐      ┌──────────────┐  │
//!   ◀──────────────────┼──│  stats listener  │◀─────│  snapshot    │  │
//!                      │  └──────────────────┘      └──────────────┘  │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use jsonpd::config::{Args, JsonpdConfig};
use jsonpd::lifecycle::{self, Shutdown};
use jsonpd::observability::{logging, metrics};
use jsonpd::stats::OutcomeCounters;

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("jsonpd: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability.log_level);
    print!("{}", lifecycle::banner(&config));

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.listener.workers)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(serve(config)) {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: JsonpdConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        workers = config.listener.workers,
        timeout_ms = config.listener.timeout_ms,
        callback_param = %config.jsonp.callback_param,
        stats_enabled = config.stats.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let counters = Arc::new(OutcomeCounters::new());
    let shutdown = Shutdown::new();
    let services = lifecycle::bind(config, counters, &shutdown).await?;

    tracing::info!(
        http = %services.http_addr,
        stats = ?services.stats_addr,
        "ready."
    );

    tokio::spawn(async move {
        lifecycle::wait_for_signal().await;
        shutdown.trigger();
    });

    services.join().await?;
    Ok(())
}
