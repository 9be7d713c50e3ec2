// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Forwarding of non-crawler page requests to the upstream application.
//! The gate relays status, content type, and body; it never rewrites what
//! the application shell returns.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Forward a page request to the upstream application.
pub async fn forward(
    client: &reqwest::Client,
    base: &str,
    path: &str,
    query: Option<&str>,
) -> Result<Response, (StatusCode, String)> {
    let target = target_url(base, path, query);

    let upstream = client.get(&target).send().await.map_err(|e| {
        (
            StatusCode::BAD_GATEWAY,
            format!("Upstream request failed: {e}"),
        )
    })?;

    // Capture status and headers before consuming the body.
    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/html; charset=utf-8")
        .to_string();

    let body = upstream.bytes().await.map_err(|e| {
        (
            StatusCode::BAD_GATEWAY,
            format!("Failed to read upstream body: {e}"),
        )
    })?;

    Ok((status, [(header::CONTENT_TYPE, content_type)], body).into_response())
}

fn target_url(base: &str, path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{base}{path}?{q}"),
        _ => format!("{base}{path}"),
    }
}
