// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Startup configuration for both binaries, read from environment variables.
//! Required variables panic with an actionable message; parsing is kept in
//! pure helpers so it stays testable.

use std::env;
use std::time::Duration;

/// Default stabilization window between navigation success and extraction.
/// Chosen empirically to let client-side script finish populating the DOM.
pub const DEFAULT_SETTLE_MS: u64 = 5000;

/// Default upper bound on a whole renderer invocation, navigation included.
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

/// What the gate serves when a crawler request fails to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackMode {
    /// Serve the unrendered application shell via the normal proxy path.
    Shell,
    /// Answer 502 and let the crawler retry later.
    Error,
}

impl FallbackMode {
    /// Parse fallback mode from the RENDER_FALLBACK environment variable.
    /// Defaults to `Shell` when unset; panics on an invalid value.
    pub fn from_env() -> Self {
        match env::var("RENDER_FALLBACK") {
            Ok(mode) => Self::parse(&mode),
            Err(_) => FallbackMode::Shell,
        }
    }

    fn parse(mode: &str) -> Self {
        match mode {
            "shell" => FallbackMode::Shell,
            "error" => FallbackMode::Error,
            _ => panic!("RENDER_FALLBACK must be 'shell' or 'error', got: {}", mode),
        }
    }
}

impl std::fmt::Display for FallbackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackMode::Shell => write!(f, "shell"),
            FallbackMode::Error => write!(f, "error"),
        }
    }
}

/// Configuration for the `prerender-gate` router service.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    /// Base URL of the application being fronted, e.g. `http://127.0.0.1:8080`.
    pub upstream_base: String,
    /// Path to the `render-page` binary spawned per crawler request.
    pub renderer_path: String,
    /// Upper bound on a single renderer invocation.
    pub render_timeout: Duration,
    /// What to serve when rendering fails.
    pub fallback: FallbackMode,
    /// Port the gate listens on.
    pub port: u16,
}

impl RouterSettings {
    /// Read settings from the environment.
    /// Panics if UPSTREAM_BASE_URL or RENDERER_PATH is missing.
    pub fn from_env() -> Self {
        let upstream_base = env::var("UPSTREAM_BASE_URL")
            .expect("UPSTREAM_BASE_URL environment variable must be set");
        let renderer_path =
            env::var("RENDERER_PATH").expect("RENDERER_PATH environment variable must be set");

        RouterSettings {
            upstream_base: normalize_base(&upstream_base),
            renderer_path,
            render_timeout: Duration::from_secs(parse_secs(
                env::var("RENDER_TIMEOUT_SECS").ok(),
                DEFAULT_RENDER_TIMEOUT_SECS,
            )),
            fallback: FallbackMode::from_env(),
            port: parse_port(env::var("PORT").ok()),
        }
    }
}

/// Configuration for the `render-page` binary.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// How long to wait after navigation success before extracting markup.
    pub settle: Duration,
    /// Explicit Chromium executable; autodetected when unset.
    pub chrome_path: Option<String>,
    /// Launch Chromium with --no-sandbox. Required in most containers.
    pub no_sandbox: bool,
}

impl RenderSettings {
    /// Read settings from the environment. Every variable is optional.
    pub fn from_env() -> Self {
        RenderSettings {
            settle: Duration::from_millis(parse_millis(
                env::var("RENDER_SETTLE_MS").ok(),
                DEFAULT_SETTLE_MS,
            )),
            chrome_path: env::var("CHROME_PATH").ok(),
            no_sandbox: flag_enabled(env::var("RENDER_NO_SANDBOX").ok()),
        }
    }
}

fn normalize_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

fn parse_millis(raw: Option<String>, default: u64) -> u64 {
    match raw {
        Some(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("expected a millisecond count, got: {}", value)),
        None => default,
    }
}

fn parse_secs(raw: Option<String>, default: u64) -> u64 {
    match raw {
        Some(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("expected a second count, got: {}", value)),
        None => default,
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    match raw {
        Some(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("PORT must be a valid port number, got: {}", value)),
        None => 3000,
    }
}

/// A flag is enabled unless explicitly set to "0" or "false".
fn flag_enabled(raw: Option<String>) -> bool {
    raw.map(|v| v != "0" && v.to_lowercase() != "false")
        .unwrap_or(true)
}
