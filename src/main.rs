// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Baithak - study together.
//!
//! A desktop study companion: a scroll-scrubbed landing sequence, sign-in
//! against a hosted or local backend, a profile, a dashboard and a personal
//! resource vault.
//!
//! Usage: `baithak [PATH]`, where PATH is the page to open first (`/vault`).

mod app;
mod backend;
mod config;
mod io;
mod models;
mod routes;
mod sequence;
mod ui;
mod util;
mod vault;

use anyhow::{Context, Result};
use app::BaithakApp;
use config::AppConfig;
use routes::Route;
use vault::VaultStore;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let backend = config.build_backend();
    let store = VaultStore::open(config.vault.file.clone()).context("Failed to open vault")?;
    let start = std::env::args()
        .nth(1)
        .map(|path| Route::parse(&path))
        .unwrap_or(Route::Landing);

    log::info!("Starting with {} backend at {}", backend.kind.label(), start);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Baithak"),
        ..Default::default()
    };

    eframe::run_native(
        "Baithak",
        options,
        Box::new(move |_cc| Ok(Box::new(BaithakApp::new(&config, backend, store, start)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
