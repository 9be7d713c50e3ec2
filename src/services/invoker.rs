// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Router-side invocation of the `render-page` binary.
//!
//! One subprocess per crawler request. The whole invocation runs under a
//! timeout so a hung navigation cannot pin the request forever.

use crate::models::render::{RenderOutcome, RenderRequest};
use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Spawn the renderer for one URL and map its exit to a [`RenderOutcome`].
///
/// Stdout and stderr are collected concurrently with the child's run
/// (reading only after exit can deadlock once a pipe fills). An invocation
/// that outlives `limit` is killed and reported as an error.
pub async fn invoke_renderer(
    renderer_path: &str,
    request: &RenderRequest,
    limit: Duration,
) -> Result<RenderOutcome> {
    let child = Command::new(renderer_path)
        .arg(&request.url)
        .kill_on_drop(true)
        .output();

    let output = timeout(limit, child)
        .await
        .map_err(|_| anyhow!("renderer timed out after {:?} for {}", limit, request.url))?
        .with_context(|| format!("failed to spawn renderer at {}", renderer_path))?;

    if !output.status.success() && !output.stderr.is_empty() {
        eprintln!(
            "Renderer stderr for {}: {}",
            request.url,
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(RenderOutcome::from_exit(output.status.code(), &stdout))
}
