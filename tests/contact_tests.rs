
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use test_submission::*;
use test_utils::*;

async fn error_of(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("error body is JSON");
    assert_eq!(body["ok"], false);
    body["error"].as_str().unwrap_or_default().to_string()
}

#[actix_rt::test]
async fn valid_submission_returns_200_with_hardening_headers() {
    let app = TestApp::spawn().await;

    let response = app.post_contact(&valid_submission()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
    assert_eq!(headers["permissions-policy"], "camera=(), microphone=(), geolocation=()");
    assert_eq!(headers["access-control-allow-origin"], ALLOWED_ORIGIN);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "ok": true }));
}

#[actix_rt::test]
async fn verification_and_relay_receive_expected_fields() {
    let app = TestApp::spawn().await;

    app.post_contact(&valid_submission()).await;

    let forms = app.upstream.captcha_forms.lock().clone();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0]["secret"], "test-recaptcha-secret");
    assert_eq!(forms[0]["response"], "valid-token");
    assert_eq!(forms[0]["remoteip"], "203.0.113.7");

    let payloads = app.upstream.relay_payloads.lock().clone();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["name"], "Jane Doe");
    assert_eq!(payloads[0]["email"], "jane@example.com");
    assert_eq!(payloads[0]["service"], "Consulting");
    assert_eq!(payloads[0]["_subject"], "New Contact Form Submission - Test");
    assert_eq!(payloads[0]["_template"], "table");
    assert!(payloads[0].get("recaptchaToken").is_none());
}

#[actix_rt::test]
async fn failed_captcha_returns_400() {
    let behavior = UpstreamBehavior {
        captcha_reply: json!({ "success": false, "error-codes": ["invalid-input-response"] }),
        ..Default::default()
    };
    let app = TestApp::spawn_with(behavior, |_| {}).await;

    let response = app.post_contact(&valid_submission()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "Captcha failed");
    assert_eq!(app.upstream.relay_calls(), 0);
}

#[actix_rt::test]
async fn missing_token_is_rejected_without_verification_call() {
    let app = TestApp::spawn().await;

    for body in [submission_without("recaptchaToken"), submission_with("recaptchaToken", json!(""))] {
        let response = app.post_contact(&body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(response).await, "Missing captcha token");
    }

    // Token check comes before field validation.
    let response = app.post_contact(&json!({ "email": "nope" })).await;
    assert_eq!(error_of(response).await, "Missing captcha token");

    assert_eq!(app.upstream.captcha_calls(), 0);
}

#[actix_rt::test]
async fn captcha_host_mismatch_returns_400() {
    let behavior = UpstreamBehavior {
        captcha_reply: json!({ "success": true, "hostname": "phish.test" }),
        ..Default::default()
    };
    let app = TestApp::spawn_with(behavior, |_| {}).await;

    let response = app.post_contact(&valid_submission()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "Captcha host mismatch");
}

#[actix_rt::test]
async fn malformed_json_returns_400() {
    let app = TestApp::spawn().await;

    let response = app.post_raw("{\"name\": ").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(response).await, "Bad JSON");
    assert_eq!(app.upstream.captcha_calls(), 0);
}

#[actix_rt::test]
async fn invalid_fields_return_their_reason() {
    let app = TestApp::spawn().await;

    let cases = [
        ("name", json!("J"), "Invalid name"),
        ("email", json!("jane@example"), "Invalid email"),
        ("email", json!(format!("{}@example.com", "a".repeat(250))), "Invalid email"),
        ("service", json!(""), "Invalid service"),
        ("message", json!("Hi"), "Invalid message"),
    ];

    for (field, value, expected) in cases {
        let response = app.post_contact(&submission_with(field, value)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{field}");
        assert_eq!(error_of(response).await, expected);
    }
    assert_eq!(app.upstream.relay_calls(), 0);
}

#[actix_rt::test]
async fn sixth_submission_within_window_is_rate_limited() {
    let app = TestApp::spawn().await;

    for _ in 0..5 {
        let response = app.post_contact(&valid_submission()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let shouted = submission_with("email", json!("JANE@EXAMPLE.COM"));
    let response = app.post_contact(&shouted).await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_of(response).await, "Too many submissions, try later");
    assert_eq!(app.upstream.relay_calls(), 5);

    let other = submission_with("email", json!("john@example.com"));
    assert_eq!(app.post_contact(&other).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn relay_error_status_returns_502_without_retry() {
    let behavior = UpstreamBehavior {
        relay_status: 502,
        relay_body: String::new(),
        ..Default::default()
    };
    let app = TestApp::spawn_with(behavior, |_| {}).await;

    let response = app.post_contact(&valid_submission()).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_of(response).await, "Upstream send failed");
    assert_eq!(app.upstream.relay_calls(), 1);
}

#[actix_rt::test]
async fn relay_body_reporting_failure_returns_502() {
    let behavior = UpstreamBehavior {
        relay_body: r#"{"success":"false","message":"Form should POST"}"#.into(),
        ..Default::default()
    };
    let app = TestApp::spawn_with(behavior, |_| {}).await;

    let response = app.post_contact(&valid_submission()).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(app.upstream.relay_calls(), 1);
}

#[actix_rt::test]
async fn relay_empty_body_with_success_status_is_accepted() {
    let behavior = UpstreamBehavior {
        relay_body: String::new(),
        ..Default::default()
    };
    let app = TestApp::spawn_with(behavior, |_| {}).await;

    let response = app.post_contact(&valid_submission()).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn slow_relay_times_out_as_upstream_failure() {
    let behavior = UpstreamBehavior {
        relay_delay: Duration::from_millis(800),
        ..Default::default()
    };
    let app = TestApp::spawn_with(behavior, |config| {
        config.outbound_timeout = Duration::from_millis(200);
    })
    .await;

    let response = app.post_contact(&valid_submission()).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_of(response).await, "Upstream send failed");
}

#[actix_rt::test]
async fn preflight_returns_empty_body_with_cors_headers() {
    let app = TestApp::spawn().await;

    let response = app.client
        .request(reqwest::Method::OPTIONS, app.contact_url())
        .header("Origin", "https://unlisted.test")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let headers = response.headers().clone();
    assert_eq!(headers["access-control-allow-origin"], "https://example.com");
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "content-type");
    assert_eq!(headers["vary"], "Origin");
    assert!(response.bytes().await.unwrap().is_empty());
    assert_eq!(app.upstream.captcha_calls(), 0);
}

#[actix_rt::test]
async fn other_methods_return_405_with_cors_headers() {
    let app = TestApp::spawn().await;

    let response = app.client
        .get(app.contact_url())
        .header("Origin", ALLOWED_ORIGIN)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["access-control-allow-origin"], ALLOWED_ORIGIN);
    assert_eq!(error_of(response).await, "Method not allowed");
}

#[actix_rt::test]
async fn health_reports_memory_store() {
    let app = TestApp::spawn().await;

    let response = app.client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rate_limit_store"]["backend"], "memory");
    assert_eq!(body["rate_limit_store"]["status"], "OK");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    let started_at = body["started_at"].as_str().expect("started_at is a string");
    assert!(chrono::DateTime::parse_from_rfc3339(started_at).is_ok());
    assert!(body["uptime"].as_str().is_some());
}

#[actix_rt::test]
async fn oversized_body_returns_json_400_with_cors_headers() {
    let app = TestApp::spawn().await;

    let oversized = submission_with("message", json!("m".repeat(70 * 1024)));
    let response = app.post_contact(&oversized).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["access-control-allow-origin"], ALLOWED_ORIGIN);
    assert_eq!(response.headers()["vary"], "Origin");
    assert_eq!(error_of(response).await, "Bad JSON");
    assert_eq!(app.upstream.captcha_calls(), 0);
}
