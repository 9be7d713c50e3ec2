// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Render invocation data model and the exit-code contract shared between
//! the `render-page` binary and the router-side invoker.

/// Exit code emitted when markup was rendered and written to stdout.
pub const EXIT_RENDERED: i32 = 0;
/// Exit code emitted when the page could not be loaded.
pub const EXIT_NAVIGATION_FAILED: i32 = 1;
/// Exit code for an invalid invocation. Matches clap's usage-error code,
/// so wrong argument counts surface as this without extra wiring.
pub const EXIT_USAGE: i32 = 2;
/// Exit code emitted when the page loaded but the snapshot query failed.
pub const EXIT_EXTRACTION_FAILED: i32 = 3;

/// A single render invocation. One request per renderer process lifetime.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// The URL to load and snapshot
    pub url: String,
}

/// Outcome of a render invocation. Exactly one is produced per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The page loaded, client-side rendering settled, and the root markup
    /// was extracted.
    Rendered { markup: String },
    /// The page could not be loaded.
    NavigationFailed,
    /// The page loaded but the markup snapshot could not be taken.
    ExtractionFailed,
    /// The renderer was invoked with the wrong number of arguments.
    UsageError,
}

impl RenderOutcome {
    /// The process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            RenderOutcome::Rendered { .. } => EXIT_RENDERED,
            RenderOutcome::NavigationFailed => EXIT_NAVIGATION_FAILED,
            RenderOutcome::UsageError => EXIT_USAGE,
            RenderOutcome::ExtractionFailed => EXIT_EXTRACTION_FAILED,
        }
    }

    /// Reconstruct an outcome from a renderer process exit.
    ///
    /// `code` is `None` when the process was killed by a signal; that and any
    /// unknown code fall into the navigation-failure class.
    pub fn from_exit(code: Option<i32>, stdout: &str) -> Self {
        match code {
            Some(EXIT_RENDERED) => RenderOutcome::Rendered {
                markup: stdout.trim_end().to_string(),
            },
            Some(EXIT_USAGE) => RenderOutcome::UsageError,
            Some(EXIT_EXTRACTION_FAILED) => RenderOutcome::ExtractionFailed,
            _ => RenderOutcome::NavigationFailed,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered { .. })
    }
}

// Manual impl so failures log as "navigation failed" rather than the Debug
// variant name.
impl std::fmt::Display for RenderOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderOutcome::Rendered { .. } => write!(f, "rendered"),
            RenderOutcome::NavigationFailed => write!(f, "navigation failed"),
            RenderOutcome::ExtractionFailed => write!(f, "extraction failed"),
            RenderOutcome::UsageError => write!(f, "usage error"),
        }
    }
}
