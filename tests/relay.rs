//! End-to-end relay behaviour against a mock scan host.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use scan_relay::http::HttpServer;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

use common::{client, relay_config, start_mock_upstream, start_relay, MockResponse};

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0xFF, 0xD9];

async fn oneshot_json(server: &HttpServer, uri: &str) -> (StatusCode, Value) {
    let response = server
        .router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn bare_mount_is_rejected_without_upstream_call() {
    let upstream = start_mock_upstream(|_| MockResponse::new(200, "image/jpeg", JPEG)).await;
    let server = HttpServer::new(relay_config(&upstream.base_url())).unwrap();

    for uri in ["/api/anime-sama", "/api/anime-sama/"] {
        let (status, body) = oneshot_json(&server, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "Chemin manquant");
        assert!(body["hint"].as_str().unwrap().starts_with("Format attendu"));
    }

    assert!(upstream.requests().is_empty(), "no outbound call expected");
}

#[tokio::test]
async fn foreign_path_is_invalid_and_echoed() {
    let upstream = start_mock_upstream(|_| MockResponse::new(200, "image/jpeg", JPEG)).await;
    let server = HttpServer::new(relay_config(&upstream.base_url())).unwrap();

    let (status, body) = oneshot_json(&server, "/images/One%20Piece/1/1.jpg").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "URL invalide", "received": "/images/One%20Piece/1/1.jpg"})
    );
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn health_reports_upstream() {
    let server = HttpServer::new(relay_config("http://127.0.0.1:9/s2/scans")).unwrap();
    let (status, body) = oneshot_json(&server, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["upstream"], "http://127.0.0.1:9/s2/scans");
}

#[tokio::test]
async fn json_chapter_map_is_parsed_and_cached_briefly() {
    let upstream =
        start_mock_upstream(|_| MockResponse::new(200, "application/json", r#"{"1":10,"2":12}"#)).await;
    let (relay, shutdown) = start_relay(relay_config(&upstream.base_url())).await;

    let res = client()
        .get(format!(
            "http://{relay}/api/anime-sama/get_nb_chap_et_img.php?oeuvre=Berserk"
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.headers()["cache-control"], "public, max-age=300");
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"1": 10, "2": 12}));

    assert_eq!(
        upstream.paths(),
        vec!["/s2/scans/get_nb_chap_et_img.php?oeuvre=Berserk"]
    );
    shutdown.trigger();
}

#[tokio::test]
async fn image_is_relayed_byte_for_byte() {
    let upstream = start_mock_upstream(|_| MockResponse::new(200, "image/jpeg", JPEG)).await;
    let (relay, shutdown) = start_relay(relay_config(&upstream.base_url())).await;

    let res = client()
        .get(format!("http://{relay}/api/anime-sama/Berserk/1/1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "image/jpeg");
    assert_eq!(
        res.headers()["cache-control"],
        "public, max-age=31536000, immutable"
    );
    assert_eq!(res.bytes().await.unwrap().as_ref(), JPEG);
    shutdown.trigger();
}

#[tokio::test]
async fn hyphenated_variant_is_used_when_original_404s() {
    let upstream = start_mock_upstream(|req| {
        if req.path.contains("One-Piece") {
            MockResponse::new(200, "image/jpeg", JPEG)
        } else {
            MockResponse::not_found()
        }
    })
    .await;
    let (relay, shutdown) = start_relay(relay_config(&upstream.base_url())).await;

    let res = client()
        .get(format!("http://{relay}/api/anime-sama/One%20Piece/1/1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.bytes().await.unwrap().as_ref(), JPEG);
    assert_eq!(
        upstream.paths(),
        vec!["/s2/scans/One%20Piece/1/1.jpg", "/s2/scans/One-Piece/1/1.jpg"]
    );
    shutdown.trigger();
}

#[tokio::test]
async fn exhausted_variants_list_every_candidate() {
    let upstream = start_mock_upstream(|_| MockResponse::not_found()).await;
    let base = upstream.base_url();
    let (relay, shutdown) = start_relay(relay_config(&base)).await;

    let res = client()
        .get(format!("http://{relay}/api/anime-sama/One%20Piece/1/1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Aucune variante n'a fonctionné");
    assert_eq!(
        body["tried"],
        json!([
            format!("{base}/One%20Piece/1/1.jpg"),
            format!("{base}/One-Piece/1/1.jpg"),
            format!("{base}/one-piece/1/1.jpg"),
        ])
    );
    assert_eq!(body["lastError"]["status"], 404);
    assert_eq!(body["lastError"]["statusText"], "Not Found");
    assert_eq!(body["lastError"]["url"], format!("{base}/one-piece/1/1.jpg"));
    assert!(body["hint"].as_str().unwrap().contains("127.0.0.1"));
    assert_eq!(upstream.requests().len(), 3);
    shutdown.trigger();
}

#[tokio::test]
async fn single_candidate_failure_mirrors_status() {
    let upstream =
        start_mock_upstream(|_| MockResponse::new(503, "text/plain", "maintenance")).await;
    let base = upstream.base_url();
    let (relay, shutdown) = start_relay(relay_config(&base)).await;

    let res = client()
        .get(format!("http://{relay}/api/anime-sama/Berserk/1/1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Erreur HTTP 503");
    assert_eq!(body["details"], "Service Unavailable");
    assert_eq!(body["url"], format!("{base}/Berserk/1/1.jpg"));
    assert_eq!(body["errorBody"], "maintenance");
    assert!(body.get("hint").is_none());
    shutdown.trigger();
}

#[tokio::test]
async fn invalid_json_is_returned_as_text() {
    let upstream =
        start_mock_upstream(|_| MockResponse::new(200, "application/json", "{not json")).await;
    let (relay, shutdown) = start_relay(relay_config(&upstream.base_url())).await;

    let res = client()
        .get(format!("http://{relay}/api/anime-sama/get_nb_chap_et_img.php?oeuvre=x"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert!(res.headers().get("cache-control").is_none());
    assert_eq!(res.text().await.unwrap(), "{not json");
    shutdown.trigger();
}

#[tokio::test]
async fn unreachable_upstream_is_server_error() {
    // Grab a free port, then release it so nothing listens there.
    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = closed.local_addr().unwrap();
    drop(closed);

    let (relay, shutdown) = start_relay(relay_config(&format!("http://{addr}/s2/scans"))).await;

    let res = client()
        .get(format!("http://{relay}/api/anime-sama/Berserk/1/1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Erreur serveur");
    assert!(!body["message"].as_str().unwrap().is_empty());
    shutdown.trigger();
}

#[tokio::test]
async fn upstream_sees_site_headers_and_method() {
    let upstream = start_mock_upstream(|_| MockResponse::new(200, "image/jpeg", JPEG)).await;
    let (relay, shutdown) = start_relay(relay_config(&upstream.base_url())).await;

    client()
        .get(format!("http://{relay}/api/anime-sama/Berserk/1/1.jpg"))
        .send()
        .await
        .unwrap();

    let requests = upstream.requests();
    let seen = &requests[0];
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.header("referer"), Some("https://anime-sama.si/"));
    assert_eq!(seen.header("origin"), Some("https://anime-sama.si"));
    assert_eq!(seen.header("pragma"), Some("no-cache"));
    assert_eq!(seen.header("sec-fetch-site"), Some("same-origin"));
    assert!(seen.header("user-agent").unwrap().starts_with("Mozilla/5.0"));
    shutdown.trigger();
}

#[tokio::test]
async fn dead_upstream_exhausts_variants_as_not_found() {
    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = closed.local_addr().unwrap();
    drop(closed);

    let base = format!("http://{addr}/s2/scans");
    let (relay, shutdown) = start_relay(relay_config(&base)).await;

    let res = client()
        .get(format!("http://{relay}/api/anime-sama/One%20Piece/1/1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Aucune variante n'a fonctionné");
    assert_eq!(body["tried"].as_array().unwrap().len(), 3);
    assert_eq!(body["lastError"]["url"], format!("{base}/one-piece/1/1.jpg"));
    assert!(!body["lastError"]["error"].as_str().unwrap().is_empty());
    assert!(body["lastError"].get("status").is_none());
    assert!(body.get("details").is_none());
    shutdown.trigger();
}

#[tokio::test]
async fn final_candidate_decides_status_after_mixed_failures() {
    let upstream = start_mock_upstream(|req| {
        if req.path.contains("One%20Piece") {
            MockResponse::new(503, "text/plain", "maintenance")
        } else {
            MockResponse::hang_up()
        }
    })
    .await;
    let base = upstream.base_url();
    let (relay, shutdown) = start_relay(relay_config(&base)).await;

    let res = client()
        .get(format!("http://{relay}/api/anime-sama/One%20Piece/1/1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Aucune variante n'a fonctionné");
    assert_eq!(body["lastError"]["url"], format!("{base}/one-piece/1/1.jpg"));
    assert!(body["lastError"]["error"].is_string());
    assert!(body.get("errorBody").is_none());
    assert_eq!(upstream.requests().len(), 3);
    shutdown.trigger();
}

#[tokio::test]
async fn untyped_body_is_relayed_as_octet_stream() {
    let upstream = start_mock_upstream(|_| MockResponse::untyped(200, JPEG)).await;
    let (relay, shutdown) = start_relay(relay_config(&upstream.base_url())).await;

    let res = client()
        .get(format!("http://{relay}/api/anime-sama/Berserk/1/1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/octet-stream");
    assert_eq!(
        res.headers()["cache-control"],
        "public, max-age=31536000, immutable"
    );
    assert_eq!(res.bytes().await.unwrap().as_ref(), JPEG);
    shutdown.trigger();
}

#[tokio::test]
async fn inbound_method_is_forwarded() {
    let upstream = start_mock_upstream(|_| MockResponse::new(200, "image/jpeg", JPEG)).await;
    let (relay, shutdown) = start_relay(relay_config(&upstream.base_url())).await;

    let res = client()
        .post(format!("http://{relay}/api/anime-sama/Berserk/1/1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(upstream.requests()[0].method, "POST");
    shutdown.trigger();
}
