//! Response composition.
//!
//! # Responsibilities
//! - Render the generic 400 page for any rejected callback
//! - Render the ESI-wrapped JSONP body for a valid callback
//! - Attach the content-type hardening headers
//!
//! # Design Decisions
//! - The body is wrapped in `<!--esi ... -->`: an ESI-capable cache strips the
//!   markers and resolves the include, anything else sees an HTML comment
//! - `/**/` separates the comment marker from the callback token
//! - `nosniff` plus a forced attachment keeps direct fetches from executing
//! - The rejection reason never reaches the client

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// Fixed page returned for every rejected callback.
pub const ERROR_BODY: &str = "<html><body><h1>400 Bad Request</h1></body></html>\n";

/// JSONP body: `callback(<esi:include src="path[?query]"/>);` inside an ESI comment.
pub fn esi_body(callback: &str, path: &str, residual_query: &str) -> String {
    let mut body = String::with_capacity(
        callback.len() + path.len() + residual_query.len() + 48,
    );
    body.push_str("<!--esi\n/**/");
    body.push_str(callback);
    body.push_str("(<esi:include src=\"");
    body.push_str(path);
    if !residual_query.is_empty() {
        body.push('?');
        body.push_str(residual_query);
    }
    body.push_str("\"/>);\n-->\n");
    body
}

/// 400 response shared by every rejection reason.
pub fn compose_error() -> Response {
    (
        StatusCode::BAD_REQUEST,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CONNECTION, "close"),
        ],
        ERROR_BODY,
    )
        .into_response()
}

/// 200 response for a validated callback.
pub fn compose_success(callback: &str, path: &str, residual_query: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            (header::CONTENT_DISPOSITION, "attachment; filename=f.txt"),
        ],
        esi_body(callback, path, residual_query),
    )
        .into_response()
}
