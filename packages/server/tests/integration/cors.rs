use reqwest::header::{ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN};

use crate::common::{TestApp, routes};

const ALLOWED: &str = "https://poll.example.com";

#[tokio::test]
async fn preflight_from_allowed_origin_is_granted() {
    let app = TestApp::with_cors_origins(&[ALLOWED]).await;

    let res = app.preflight(routes::VOTE, ALLOWED, "POST").await;

    assert!(res.status().is_success(), "status: {}", res.status());
    assert_eq!(
        res.headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some(ALLOWED)
    );
    let methods = res
        .headers()
        .get(ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(methods.contains("POST"), "allow-methods: {methods}");
}

#[tokio::test]
async fn preflight_from_other_origin_gets_no_allow_header() {
    let app = TestApp::with_cors_origins(&[ALLOWED]).await;

    let res = app
        .preflight(routes::VOTE, "https://evil.example.net", "POST")
        .await;

    assert!(res.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn allowed_origin_is_echoed_on_error_responses() {
    let app = TestApp::with_cors_origins(&[ALLOWED]).await;

    let res = app
        .client
        .get(format!("http://{}{}", app.addr, routes::results("poll-1")))
        .header("Origin", ALLOWED)
        .send()
        .await
        .expect("Failed to send GET request");

    assert_eq!(res.status().as_u16(), 500);
    assert_eq!(
        res.headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some(ALLOWED)
    );
}
