// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use prerender_gate::app::{create_router, AppState, VERSION};
use prerender_gate::models::settings::RouterSettings;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let settings = RouterSettings::from_env();

    println!(
        "Fronting {} with renderer {} (timeout {:?}, fallback {})",
        settings.upstream_base, settings.renderer_path, settings.render_timeout, settings.fallback
    );

    let port = settings.port;
    let state = AppState {
        settings: Arc::new(settings),
        http: reqwest::Client::new(),
    };

    let app = create_router(state);

    // Bind to 0.0.0.0 to accept connections from any network interface (required for Docker)
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    println!("prerender-gate v{} listening on {}", VERSION, addr);

    axum::serve(listener, app).await.unwrap();
}
