//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;

use crate::api::HttpTicketApi;
use crate::config::UiConfig;
use crate::store::{UiState, UiStore};
use crate::tickets::TicketStore;

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// The ticket cache
    pub tickets: RwSignal<TicketStore>,
    /// Page state
    pub ui: UiStore,
    /// Settings loaded at startup
    pub config: StoredValue<UiConfig>,
    /// Trigger to reload tickets from the server - read
    pub reload_trigger: ReadSignal<u32>,
    /// Trigger to reload tickets from the server - write
    set_reload_trigger: WriteSignal<u32>,
}

impl AppContext {
    pub fn new(config: UiConfig) -> Self {
        let (reload_trigger, set_reload_trigger) = signal(0u32);
        Self {
            tickets: RwSignal::new(TicketStore::new()),
            ui: UiStore::new(UiState::from_config(&config)),
            config: StoredValue::new(config),
            reload_trigger,
            set_reload_trigger,
        }
    }

    /// Trigger a reload of tickets
    pub fn reload(&self) {
        self.set_reload_trigger.update(|v| *v += 1);
    }

    /// API client for the configured server
    pub fn api(&self) -> HttpTicketApi {
        HttpTicketApi::new(self.config.with_value(UiConfig::resolved_api_base))
    }
}

/// Get the app context
pub fn use_app_context() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}
