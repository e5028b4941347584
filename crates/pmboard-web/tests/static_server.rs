//! Static server routes

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pmboard_core::PmboardConfig;
use tower::ServiceExt;

async fn get(router: axum::Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

fn config() -> PmboardConfig {
    PmboardConfig {
        api_base_url: "https://pm.example.com/api/".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_app_config_points_at_backend() {
    let dist = tempfile::tempdir().unwrap();
    let router = pmboard_web::create_router(&config(), dist.path());

    let (status, body) = get(router, "/app-config.json").await;

    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["apiBaseUrl"], "https://pm.example.com/api");
}

#[tokio::test]
async fn test_spa_fallback_serves_index() {
    let dist = tempfile::tempdir().unwrap();
    std::fs::write(dist.path().join("index.html"), "<html>pmboard spa</html>").unwrap();
    std::fs::write(dist.path().join("app.js"), "console.log(1)").unwrap();

    let router = pmboard_web::create_router(&config(), dist.path());
    let (status, body) = get(router.clone(), "/admin/dashboard/projects").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("pmboard spa"));

    let (status, body) = get(router, "/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "console.log(1)");
}

#[tokio::test]
async fn test_missing_build_shows_setup_page() {
    let dist = tempfile::tempdir().unwrap();
    let router = pmboard_web::create_router(&config(), &dist.path().join("dist"));

    let (status, body) = get(router, "/developer-dashboard").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Build Required"));
}
