//! JSONP callback handling.
//!
//! # Data Flow
//! ```text
//! ?callback=<name>
//!     → http/request.rs (extract callback, encode residual query)
//!     → validator.rs (classify: ok / empty / too long / reserved / invalid)
//!     → http/response.rs (400 page or ESI-wrapped JSONP body)
//! ```
//!
//! # Design Decisions
//! - The callback is written into an `application/javascript` body unescaped,
//!   so validation is an allow-list, never a sanitizer
//! - Rejection reasons stay server-side (logs, counters); clients get one
//!   generic 400 page

pub mod validator;

pub use validator::{CallbackValidator, ValidationOutcome, DEFAULT_MAX_CALLBACK_LEN, RESERVED_WORDS};
