//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all handler)
//!     → request.rs (request ID, callback + residual query extraction)
//!     → crate::jsonp::validator (classify callback)
//!     → response.rs (400 page or ESI/JSONP body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, CallbackQuery, MakeRequestUuid, X_REQUEST_ID};
pub use response::{compose_error, compose_success, esi_body};
pub use server::{AppState, HttpServer};
