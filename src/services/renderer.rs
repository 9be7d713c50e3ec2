// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Headless snapshot rendering.
//!
//! Each call owns one fresh browser process and one page for its lifetime;
//! nothing is pooled or reused, so no state can leak between renders.

use crate::models::render::{RenderOutcome, RenderRequest};
use crate::models::settings::RenderSettings;
use anyhow::{anyhow, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::time::sleep;

/// Page-context query for the serialized root markup. The root element's
/// own tags are restored by [`wrap_markup`].
const ROOT_MARKUP_EXPRESSION: &str = "document.documentElement.innerHTML";

/// Load a URL, wait for client-side rendering to settle, and extract the
/// resulting markup.
///
/// Exactly one [`RenderOutcome`] is produced per call. `Err` is reserved for
/// environment failures (no Chromium, launch failure); callers map those to
/// the navigation-failure exit class.
pub async fn render_page(
    request: &RenderRequest,
    settings: &RenderSettings,
) -> Result<RenderOutcome> {
    let (mut browser, mut handler) = Browser::launch(browser_config(settings)?).await?;

    // Pump CDP events for the lifetime of the browser.
    let driver = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let outcome = snapshot(&browser, request, settings).await;

    // Best-effort teardown; the outcome is already decided.
    let _ = browser.close().await;
    let _ = browser.wait().await;
    driver.abort();

    outcome
}

/// Navigate, wait, extract. Runs against an already-launched browser.
async fn snapshot(
    browser: &Browser,
    request: &RenderRequest,
    settings: &RenderSettings,
) -> Result<RenderOutcome> {
    let page = browser.new_page("about:blank").await?;

    if page.goto(request.url.as_str()).await.is_err()
        || page.wait_for_navigation().await.is_err()
    {
        // No stabilization wait on a failed load.
        return Ok(RenderOutcome::NavigationFailed);
    }

    // Blind timer, not a readiness signal: give client-side script time to
    // populate the DOM before taking the snapshot.
    sleep(settings.settle).await;

    let inner = match page.evaluate(ROOT_MARKUP_EXPRESSION).await {
        Ok(result) => match result.into_value::<String>() {
            Ok(inner) => inner,
            Err(_) => return Ok(RenderOutcome::ExtractionFailed),
        },
        Err(_) => return Ok(RenderOutcome::ExtractionFailed),
    };

    Ok(RenderOutcome::Rendered {
        markup: wrap_markup(&inner),
    })
}

fn browser_config(settings: &RenderSettings) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder();
    if settings.no_sandbox {
        builder = builder.no_sandbox();
    }
    if let Some(path) = &settings.chrome_path {
        builder = builder.chrome_executable(path);
    }
    builder.build().map_err(|e| anyhow!(e))
}

/// Restore the explicit root tags around the extracted inner markup.
pub fn wrap_markup(inner: &str) -> String {
    format!("<html>{}</html>", inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_markup_adds_root_tags() {
        assert_eq!(
            wrap_markup("<head></head><body>hi</body>"),
            "<html><head></head><body>hi</body></html>"
        );
    }

    #[test]
    fn test_wrap_markup_empty_document() {
        assert_eq!(wrap_markup(""), "<html></html>");
    }

    #[test]
    fn test_browser_config_with_explicit_executable() {
        // An explicit path skips Chromium autodetection, so this builds even
        // on machines without a browser installed.
        let settings = RenderSettings {
            settle: std::time::Duration::from_millis(100),
            chrome_path: Some("/usr/bin/chromium".to_string()),
            no_sandbox: true,
        };
        assert!(browser_config(&settings).is_ok());
    }
}
