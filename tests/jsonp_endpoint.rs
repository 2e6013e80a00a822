//! End-to-end tests for the JSONP endpoint over real sockets.

use jsonpd::stats::StatsSnapshot;
use jsonpd::ValidationOutcome;
use reqwest::StatusCode;

mod common;

const ERROR_PAGE: &str = "<html><body><h1>400 Bad Request</h1></body></html>\n";

#[tokio::test]
async fn test_callback_without_extra_params() {
    let server = common::start_server(|_| {}).await;
    let res = common::client()
        .get(format!("{}/x?callback=foo", server.base_url))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers();
    assert_eq!(headers["content-type"], "application/javascript; charset=utf-8");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["content-disposition"], "attachment; filename=f.txt");
    assert_eq!(
        res.text().await.unwrap(),
        "<!--esi\n/**/foo(<esi:include src=\"/x\"/>);\n-->\n"
    );

    server.stop().await;
}

#[tokio::test]
async fn test_residual_params_forwarded() {
    let server = common::start_server(|_| {}).await;
    let res = common::client()
        .get(format!("{}/x?callback=foo&a=1", server.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.text().await.unwrap(),
        "<!--esi\n/**/foo(<esi:include src=\"/x?a=1\"/>);\n-->\n"
    );

    server.stop().await;
}

#[tokio::test]
async fn test_rejected_callbacks_get_generic_page() {
    let server = common::start_server(|_| {}).await;
    let client = common::client();

    for query in ["callback=", "callback=this", "callback=2foo", "a=1"] {
        let res = client
            .get(format!("{}/x?{}", server.base_url, query))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", query);
        assert_eq!(res.headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(res.text().await.unwrap(), ERROR_PAGE);
    }

    let snap = server.counters.snapshot();
    assert_eq!(snap.e_empty, 2);
    assert_eq!(snap.e_reserved, 1);
    assert_eq!(snap.e_invalid, 1);
    assert_eq!(snap.ok, 0);

    server.stop().await;
}

#[tokio::test]
async fn test_too_long_increments_counter_once() {
    let server = common::start_server(|_| {}).await;
    let before = server.counters.get(ValidationOutcome::TooLong);

    let res = common::client()
        .get(format!("{}/x?callback={}", server.base_url, "x".repeat(51)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await.unwrap(), ERROR_PAGE);
    assert_eq!(server.counters.get(ValidationOutcome::TooLong), before + 1);
    assert_eq!(server.counters.get(ValidationOutcome::Invalid), 0);

    server.stop().await;
}

#[tokio::test]
async fn test_encoded_injection_is_rejected() {
    let server = common::start_server(|_| {}).await;
    let res = common::client()
        .get(format!(
            "{}/x?callback=alert(1)%3B%2F%2F",
            server.base_url
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.counters.get(ValidationOutcome::Invalid), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_stats_listener_reflects_requests() {
    let server = common::start_server(|_| {}).await;
    let client = common::client();

    for query in ["callback=ok1", "callback=ok2", "callback=var"] {
        client
            .get(format!("{}/?{}", server.base_url, query))
            .send()
            .await
            .unwrap();
    }

    let stats_addr = server.stats_addr.expect("stats listener enabled by default");
    let text = common::read_stats(stats_addr).await;
    let snap: StatsSnapshot = text.parse().unwrap();
    assert_eq!(snap.ok, 2);
    assert_eq!(snap.e_reserved, 1);
    assert_eq!(snap.e_toolong, 0);

    let keys: Vec<_> = text.lines().filter_map(|l| l.split(':').next()).collect();
    assert_eq!(keys, ["uptime", "ok", "e_empty", "e_toolong", "e_reserved", "e_invalid"]);

    server.stop().await;
}

#[tokio::test]
async fn test_stats_listener_can_be_disabled() {
    let server = common::start_server(|c| c.stats.enabled = false).await;
    assert!(server.stats_addr.is_none());

    let res = common::client()
        .get(format!("{}/x?callback=foo", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.stop().await;
}
