//! Static server for the built SPA
//!
//! Serves `dist/` with an `index.html` fallback so role-prefixed paths
//! survive a reload, plus `/app-config.json` telling the SPA where the
//! REST backend lives.

use anyhow::{Context, Result};
use axum::{routing::get, Json, Router, response::Html};
use pmboard_core::PmboardConfig;
use serde_json::json;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

/// Build the router for `dist_dir`
pub fn create_router(config: &PmboardConfig, dist_dir: &Path) -> Router {
    let app_config = json!({ "apiBaseUrl": config.api_base() });
    let router = Router::new().route(
        "/app-config.json",
        get(move || {
            let app_config = app_config.clone();
            async move { Json(app_config) }
        }),
    );

    let index = dist_dir.join("index.html");
    if index.is_file() {
        router.fallback_service(ServeDir::new(dist_dir).fallback(ServeFile::new(index)))
    } else {
        warn!(dist = %dist_dir.display(), "SPA not built, serving setup page");
        router.fallback(build_required)
    }
}

async fn build_required() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>pmboard - Build Required</title>
    <style>
        body { font-family: system-ui, sans-serif; background: #f5f5f5; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; }
        .setup-message { max-width: 600px; background: white; padding: 2rem; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
        code { background: #f0f0f0; padding: 0.25rem 0.5rem; border-radius: 4px; }
    </style>
</head>
<body>
    <div class="setup-message">
        <h1>pmboard Web UI - Build Required</h1>
        <p>The Leptos WASM frontend needs to be compiled first.</p>
        <ol>
            <li>Install Trunk: <code>cargo install trunk</code></li>
            <li>Add WASM target: <code>rustup target add wasm32-unknown-unknown</code></li>
            <li>Build frontend: <code>cd crates/pmboard-web &amp;&amp; trunk build --release</code></li>
            <li>Restart: <code>pmboard web</code></li>
        </ol>
    </div>
</body>
</html>"#,
    )
}

/// Serve until the process is stopped
pub async fn run(config: &PmboardConfig, dist_dir: &Path, port: u16) -> Result<()> {
    let router = create_router(config, dist_dir);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, api = config.api_base(), "Web server listening");
    println!("Web server listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
