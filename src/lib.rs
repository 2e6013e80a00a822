//! jsonpd: JSONP endpoint that defers content assembly to an ESI edge cache.

pub mod config;
pub mod http;
pub mod jsonp;
pub mod lifecycle;
pub mod observability;
pub mod stats;

pub use config::JsonpdConfig;
pub use http::HttpServer;
pub use jsonp::{CallbackValidator, ValidationOutcome};
pub use lifecycle::Shutdown;
pub use stats::{OutcomeCounters, OutcomeSink};
