//! Gofast Frontend Entry Point

mod models;
mod error;
mod format;
mod time;
mod tickets;
mod tree;
mod filter;
mod reorder;
mod graph;
mod api;
mod actions;
mod config;
mod store;
mod context;
mod dialog;
mod markdown;
mod components;
mod app;

use app::App;
use config::UiConfig;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();

    let loaded = UiConfig::load();
    let config = loaded.as_ref().ok().cloned().flatten().unwrap_or_default();
    if let Err(e) = console_logger::init(&config.log_level, config.log_capacity) {
        web_sys::console::warn_1(&format!("{}, falling back to info", e).into());
        let _ = console_logger::init("info", config.log_capacity);
    }
    // Logged only now that a subscriber is installed
    match loaded {
        Ok(Some(_)) => tracing::debug!(target: "config", "Loaded stored configuration"),
        Ok(None) => tracing::info!(target: "config", "No stored configuration, using defaults"),
        Err(e) => tracing::warn!(target: "config", "{}, using defaults", e),
    }
    tracing::info!(target: "app", "starting, api at {}", config.resolved_api_base());

    mount_to_body(move || view! { <App config=config.clone() /> });
}
