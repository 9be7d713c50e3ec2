// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Headless snapshot renderer. One invocation loads one URL, waits for
//! client-side rendering to settle, and prints the wrapped root markup on
//! standard output.
//!
//! Exit status: 0 when markup was printed, 1 when the page could not be
//! loaded, 2 on a usage error, 3 when extraction failed.

use clap::Parser;
use prerender_gate::models::render::{RenderOutcome, RenderRequest, EXIT_NAVIGATION_FAILED};
use prerender_gate::models::settings::RenderSettings;
use prerender_gate::services::renderer::render_page;
use std::process;

/// Render a URL in a headless browser and print the settled markup.
#[derive(Parser)]
#[command(name = "render-page", version)]
struct Args {
    /// The URL to render
    url: String,
}

#[tokio::main]
async fn main() {
    // A wrong argument count never gets past here: clap prints usage on
    // stderr and exits with its usage code before any navigation.
    let args = Args::parse();

    let settings = RenderSettings::from_env();
    let request = RenderRequest { url: args.url };

    match render_page(&request, &settings).await {
        Ok(RenderOutcome::Rendered { markup }) => println!("{}", markup),
        Ok(outcome) => process::exit(outcome.exit_code()),
        Err(e) => {
            eprintln!("Could not drive the headless browser: {}", e);
            process::exit(EXIT_NAVIGATION_FAILED);
        }
    }
}
