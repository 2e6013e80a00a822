//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → command-line flags (args.rs)
//!     → validation.rs (semantic checks)
//!     → JsonpdConfig (validated, immutable)
//!     → plain values handed to each subsystem
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::Args;
pub use loader::{read_config, ConfigError};
pub use schema::{JsonpConfig, JsonpdConfig, ListenerConfig, ObservabilityConfig, StatsConfig};
pub use validation::{validate_config, ValidationError};
