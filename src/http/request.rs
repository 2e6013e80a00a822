//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for tracing
//! - Split the callback parameter out of the query string
//! - Re-encode the remaining parameters for the ESI include URL
//!
//! # Design Decisions
//! - Query decoding follows `application/x-www-form-urlencoded` rules
//! - First callback value wins; every occurrence is removed from the residual
//! - Residual keys are sorted so the include URL is deterministic

use axum::http::{HeaderMap, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::form_urlencoded;
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Assigns a fresh UUID v4 to requests that arrive without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID header value, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Callback value and the rest of the query, ready for the include URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallbackQuery {
    /// Decoded callback value; empty when the parameter is absent.
    pub callback: String,
    /// Remaining parameters, form-encoded; empty when none remain.
    pub residual: String,
}

impl CallbackQuery {
    /// Split `param` out of `raw_query`.
    pub fn parse(raw_query: Option<&str>, param: &str) -> Self {
        let raw = raw_query.unwrap_or("");
        let mut callback = None;
        let mut rest = Vec::new();

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            if key == param {
                if callback.is_none() {
                    callback = Some(value.into_owned());
                }
            } else {
                rest.push((key.into_owned(), value.into_owned()));
            }
        }

        // Stable: repeated keys keep their original relative order.
        rest.sort_by(|a, b| a.0.cmp(&b.0));

        let residual = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(rest.iter())
            .finish();

        Self {
            callback: callback.unwrap_or_default(),
            residual,
        }
    }
}
