// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router
//! directly without starting the full binary.

use crate::models::crawler::{canonical_path_query, CrawlerSignal};
use crate::models::render::{RenderOutcome, RenderRequest};
use crate::models::settings::{FallbackMode, RouterSettings};
use crate::models::version::VersionResponse;
use crate::services::invoker::invoke_renderer;
use crate::services::proxy;
use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `GATE_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("GATE_VERSION");

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RouterSettings>,
    /// Shared connection pool for upstream forwarding.
    pub http: reqwest::Client,
}

pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        agent: "prerender-gate".to_string(),
        version: VERSION.to_string(),
    })
}

/// Catch-all page handler: classify the requester, then either forward the
/// request untouched or answer with a pre-rendered snapshot.
///
/// Only GET page views are in scope for cloaking; the gate does not front
/// non-idempotent requests.
pub async fn page_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response, (StatusCode, String)> {
    if method != Method::GET {
        return Err((
            StatusCode::METHOD_NOT_ALLOWED,
            "Only GET page views pass through the gate".to_string(),
        ));
    }

    if CrawlerSignal::from_query(uri.query()).is_crawler() {
        render_for_crawler(&state, &uri).await
    } else {
        proxy::forward(
            &state.http,
            &state.settings.upstream_base,
            uri.path(),
            uri.query(),
        )
        .await
    }
}

/// Obtain a snapshot for a crawler request and turn it into a response.
///
/// A failed render never masquerades as a snapshot: depending on the
/// configured fallback mode the gate either serves the unrendered shell
/// explicitly or answers 502.
async fn render_for_crawler(
    state: &AppState,
    uri: &Uri,
) -> Result<Response, (StatusCode, String)> {
    let request = RenderRequest {
        url: format!(
            "{}{}",
            state.settings.upstream_base,
            canonical_path_query(uri.path(), uri.query())
        ),
    };

    let failure = match invoke_renderer(
        &state.settings.renderer_path,
        &request,
        state.settings.render_timeout,
    )
    .await
    {
        Ok(RenderOutcome::Rendered { markup }) => return Ok(rendered_response(markup)),
        Ok(outcome) => outcome.to_string(),
        Err(e) => e.to_string(),
    };

    eprintln!(
        "Rendering {} failed ({}), fallback mode: {}",
        request.url, failure, state.settings.fallback
    );

    match state.settings.fallback {
        FallbackMode::Shell => {
            proxy::forward(
                &state.http,
                &state.settings.upstream_base,
                uri.path(),
                uri.query(),
            )
            .await
        }
        FallbackMode::Error => Err((
            StatusCode::BAD_GATEWAY,
            format!("Pre-rendering failed: {failure}"),
        )),
    }
}

fn rendered_response(markup: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::VARY, "Accept-Encoding"),
        ],
        markup,
    )
        .into_response()
}

/// Build the Axum application router.
///
/// `/version` is the only named route; every other GET is classified and
/// either proxied or rendered. Non-GET methods are out of scope for the
/// gate and answer 405.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(version_handler))
        .fallback(page_handler)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn stub_renderer(name: &str, script: &str) -> String {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, script).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn test_app(renderer_path: &str, fallback: FallbackMode) -> Router {
        // Upstream points at a discard port so proxy attempts fail fast.
        let settings = RouterSettings {
            upstream_base: "http://127.0.0.1:9".to_string(),
            renderer_path: renderer_path.to_string(),
            render_timeout: Duration::from_secs(5),
            fallback,
            port: 0,
        };
        create_router(AppState {
            settings: Arc::new(settings),
            http: reqwest::Client::new(),
        })
    }

    #[tokio::test]
    async fn test_version_endpoint_response() {
        let app = test_app("/bin/false", FallbackMode::Error);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/version")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let version_response: VersionResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(version_response.agent, "prerender-gate");
        assert_eq!(version_response.version, VERSION);
    }

    #[tokio::test]
    async fn test_version_follows_semver_format() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].parse::<u32>().is_ok());
        assert!(parts[1].parse::<u32>().is_ok());
        assert!(parts[2].parse::<u32>().is_ok());
    }

    #[tokio::test]
    async fn test_non_crawler_with_unreachable_upstream_is_bad_gateway() {
        let app = test_app("/bin/false", FallbackMode::Error);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_crawler_request_serves_rendered_markup() {
        let renderer = stub_renderer(
            "gate-app-render-ok.sh",
            "#!/bin/sh\necho '<html><body>Welcome home</body></html>'\n",
        );
        let app = test_app(&renderer, FallbackMode::Error);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/?_escaped_fragment_=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        assert_eq!(response.headers().get("vary").unwrap(), "Accept-Encoding");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"<html><body>Welcome home</body></html>");
    }

    #[tokio::test]
    async fn test_crawler_render_failure_error_mode_is_bad_gateway() {
        let renderer = stub_renderer("gate-app-render-fail.sh", "#!/bin/sh\nexit 1\n");
        let app = test_app(&renderer, FallbackMode::Error);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/?_escaped_fragment_=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_crawler_render_failure_shell_mode_falls_back_to_proxy() {
        // Renderer fails and the fallback path hits the unreachable upstream,
        // so the shell fallback surfaces the proxy's 502 rather than a
        // renderer error.
        let renderer = stub_renderer("gate-app-render-fail2.sh", "#!/bin/sh\nexit 1\n");
        let app = test_app(&renderer, FallbackMode::Shell);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/?_escaped_fragment_=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_non_get_method_is_rejected() {
        let app = test_app("/bin/false", FallbackMode::Error);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
