// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ChatterGrid - a soundboard
//!
//! A cross-platform desktop application for arranging audio clips in a
//! grid, playing them, and saving or sharing the arrangement.

mod app;
mod config;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::ChatterGridApp;
use config::Settings;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let settings_path = Settings::default_path();
    let settings = Settings::load_or_default(&settings_path);
    let window = settings.window.clone();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([window.width, window.height])
            .with_min_inner_size([window.min_width, window.min_height])
            .with_maximized(window.maximized)
            .with_drag_and_drop(true)
            .with_title("ChatterGrid"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "ChatterGrid",
        options,
        Box::new(|_cc| Ok(Box::new(ChatterGridApp::new(settings, settings_path)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
