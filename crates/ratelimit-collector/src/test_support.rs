//! Local mock registry endpoints for scrape tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use tokio::net::TcpListener;

use crate::exporter::Exporter;
use crate::snapshot::QuotaObservation;

pub const TEST_TOKEN: &str = "test-token";

/// Token exchange body issued now, valid for five minutes.
pub fn token_body(token: &str) -> String {
    serde_json::json!({
        "token": token,
        "access_token": token,
        "expires_in": 300,
        "issued_at": Utc::now().to_rfc3339(),
    })
    .to_string()
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Response carrying the given headers with a 200 status.
pub fn quota_response(pairs: &[(&'static str, &str)]) -> Response {
    let mut response = StatusCode::OK.into_response();
    for (name, value) in pairs {
        response
            .headers_mut()
            .insert(*name, HeaderValue::from_str(value).unwrap());
    }
    response
}

/// Anonymous token endpoint; returns the token URL.
pub async fn auth_server() -> String {
    let base = serve(Router::new().route("/token", any(|| async { token_body(TEST_TOKEN) }))).await;
    format!("{base}/token")
}

/// Token endpoint that insists on the given Basic credentials.
pub async fn basic_auth_server(username: &str, password: &str) -> String {
    let expected = format!("Basic {}", STANDARD.encode(format!("{username}:{password}")));
    let base = serve(Router::new().route(
        "/token",
        any(move |headers: HeaderMap| {
            let expected = expected.clone();
            async move {
                match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                    Some(value) if value == expected => {
                        (StatusCode::OK, token_body(TEST_TOKEN)).into_response()
                    }
                    _ => StatusCode::UNAUTHORIZED.into_response(),
                }
            }
        }),
    ))
    .await;
    format!("{base}/token")
}

/// Token endpoint that answers once and returns 503 afterwards.
pub async fn one_shot_auth_server() -> String {
    let served = Arc::new(AtomicUsize::new(0));
    let base = serve(Router::new().route(
        "/token",
        any(move || {
            let served = served.clone();
            async move {
                if served.fetch_add(1, Ordering::SeqCst) == 0 {
                    (StatusCode::OK, token_body(TEST_TOKEN)).into_response()
                } else {
                    StatusCode::SERVICE_UNAVAILABLE.into_response()
                }
            }
        }),
    ))
    .await;
    format!("{base}/token")
}

/// Anonymous token endpoint that counts exchanges.
pub async fn counting_auth_server(hits: Arc<AtomicUsize>) -> String {
    let base = serve(Router::new().route(
        "/token",
        any(move || {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                token_body(TEST_TOKEN)
            }
        }),
    ))
    .await;
    format!("{base}/token")
}

/// Answers every request with `status` and an empty body.
pub async fn status_server(status: StatusCode) -> String {
    serve(Router::new().fallback(move || async move { status })).await
}

/// Answers every request with 200 and `body`.
pub async fn body_server(body: &'static str) -> String {
    serve(Router::new().fallback(move || async move { body })).await
}

/// Answers every request with 200 and the given headers.
pub async fn headers_server(pairs: &[(&'static str, &'static str)]) -> String {
    let pairs = pairs.to_vec();
    serve(Router::new().fallback(move || {
        let pairs = pairs.clone();
        async move { quota_response(&pairs) }
    }))
    .await
}

/// Healthy rate-limit endpoint reporting 100 / 76.
pub async fn rate_limit_server() -> String {
    headers_server(&[
        ("ratelimit-limit", "100;m21600"),
        ("ratelimit-remaining", "76;m21600"),
    ])
    .await
}

/// One scrape ran, it failed, and nothing was ever observed.
pub async fn assert_failed_from_zero(exporter: &Exporter) {
    let snapshot = exporter.snapshot().await;
    assert_eq!(snapshot.observation, QuotaObservation::default());
    assert_eq!(snapshot.scrapes_total, 1);
    assert_eq!(snapshot.failures_total, 1);
}
