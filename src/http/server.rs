//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all JSONP handler
//! - Wire up middleware (tracing, request ID, timeout)
//! - Coordinate each request: extract, validate, count, compose
//! - Serve until the shutdown broadcast fires

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Uri},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::JsonpdConfig;
use crate::http::request::{request_id, CallbackQuery, MakeRequestUuid};
use crate::http::response::{compose_error, compose_success};
use crate::jsonp::CallbackValidator;
use crate::stats::OutcomeSink;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<CallbackValidator>,
    pub callback_param: Arc<str>,
    pub sink: Arc<dyn OutcomeSink>,
}

/// HTTP server for the JSONP endpoint.
pub struct HttpServer {
    router: Router,
    config: JsonpdConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: JsonpdConfig, validator: CallbackValidator, sink: Arc<dyn OutcomeSink>) -> Self {
        let state = AppState {
            validator: Arc::new(validator),
            callback_param: Arc::from(config.jsonp.callback_param.as_str()),
            sink,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &JsonpdConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(jsonp_handler))
            .route("/", any(jsonp_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(config.listener.timeout()))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, e.g. for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            callback_param = %self.config.jsonp.callback_param,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Per-request span. Carries the path only: the query holds the raw callback.
fn request_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request.headers()),
    )
}

/// Any method, any path: validate the callback and answer with JSONP or 400.
async fn jsonp_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let query = CallbackQuery::parse(uri.query(), &state.callback_param);
    let outcome = state.validator.validate(&query.callback);
    state.sink.record(outcome);

    if !outcome.is_valid() {
        tracing::warn!(
            reason = %outcome,
            callback = %state.validator.truncate_for_log(&query.callback),
            "Rejected callback"
        );
        return compose_error();
    }

    tracing::debug!(
        callback = %query.callback,
        path = %uri.path(),
        "Serving JSONP"
    );
    compose_success(&query.callback, uri.path(), &query.residual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonp::{ValidationOutcome, DEFAULT_MAX_CALLBACK_LEN};
    use crate::stats::OutcomeCounters;
    use axum::body::to_bytes;
    use axum::http::{header, HeaderMap, Method, StatusCode};
    use std::io;
    use std::sync::Mutex;
    use tower::ServiceExt;

    fn server(config: JsonpdConfig) -> (HttpServer, Arc<OutcomeCounters>) {
        let counters = Arc::new(OutcomeCounters::new());
        (HttpServer::new(config, CallbackValidator::default(), counters.clone()), counters)
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, HeaderMap, String) {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_callback() {
        let (server, counters) = server(JsonpdConfig::default());
        let (status, headers, body) = send(server.router(), Method::GET, "/x?callback=foo&a=1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "application/javascript; charset=utf-8");
        assert!(headers.contains_key("x-request-id"));
        assert_eq!(body, "<!--esi\n/**/foo(<esi:include src=\"/x?a=1\"/>);\n-->\n");
        assert_eq!(counters.get(ValidationOutcome::Valid), 1);
    }

    #[tokio::test]
    async fn test_any_method_and_root_path() {
        let (server, _) = server(JsonpdConfig::default());
        let (status, _, body) = send(server.router(), Method::POST, "/?callback=cb").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("cb(<esi:include src=\"/\"/>);"));
    }

    #[tokio::test]
    async fn test_rejections_are_indistinguishable() {
        let (server, counters) = server(JsonpdConfig::default());
        let long = "x".repeat(DEFAULT_MAX_CALLBACK_LEN + 1);
        let uris = [
            "/x".to_string(),
            "/x?callback=".to_string(),
            "/x?callback=this".to_string(),
            "/x?callback=2foo".to_string(),
            format!("/x?callback={}", long),
        ];

        let mut bodies = Vec::new();
        for uri in &uris {
            let (status, headers, body) = send(server.router(), Method::GET, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(headers[header::CONNECTION], "close");
            bodies.push(body);
        }
        assert!(bodies.windows(2).all(|w| w[0] == w[1]));

        let snap = counters.snapshot();
        assert_eq!(snap.e_empty, 2);
        assert_eq!(snap.e_reserved, 1);
        assert_eq!(snap.e_invalid, 1);
        assert_eq!(snap.e_toolong, 1);
        assert_eq!(snap.ok, 0);
    }

    #[tokio::test]
    async fn test_custom_callback_param() {
        let mut config = JsonpdConfig::default();
        config.jsonp.callback_param = "jsonp".to_string();
        let (server, _) = server(config);

        let (status, _, body) = send(server.router(), Method::GET, "/d?jsonp=f&callback=g").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/**/f(<esi:include src=\"/d?callback=g\"/>);"));
    }

    #[tokio::test]
    async fn test_rejected_callback_logged_truncated() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (server, counters) = server(JsonpdConfig::default());
        let uri = format!("/x?callback={}YYYY", "x".repeat(DEFAULT_MAX_CALLBACK_LEN));
        let request = Request::builder()
            .uri(uri)
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["x-request-id"], "req-42");
        assert_eq!(counters.get(ValidationOutcome::TooLong), 1);

        let output = logs.contents();
        assert!(output.contains("Rejected callback"), "{}", output);
        assert!(output.contains(&"x".repeat(DEFAULT_MAX_CALLBACK_LEN)), "{}", output);
        assert!(!output.contains("YYYY"), "{}", output);
        assert!(output.contains("request_id=req-42"), "{}", output);
    }
}
