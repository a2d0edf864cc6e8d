//! UI Configuration
//!
//! Small per-browser settings kept in `localStorage`. Every field has a
//! default, so a partial or older entry still loads.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::filter::{default_sort, SortKey, TicketFilter};

pub const STORAGE_KEY: &str = "gofast.ui";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Absolute API origin; empty means the page's own origin
    pub api_base: String,
    /// `tracing` level filter
    pub log_level: String,
    /// Lines kept for the log panel
    pub log_capacity: usize,
    pub sort: Vec<SortKey>,
    pub filter: TicketFilter,
    /// Outer radius of the ticket graph, px
    pub graph_radius: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            log_level: "info".to_string(),
            log_capacity: console_logger::DEFAULT_CAPACITY,
            sort: default_sort(),
            filter: TicketFilter::default(),
            graph_radius: 240.0,
        }
    }
}

impl UiConfig {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(content)?;
        if config.sort.is_empty() {
            config.sort = default_sort();
        }
        if config.graph_radius <= 0.0 {
            config.graph_radius = Self::default().graph_radius;
        }
        Ok(config)
    }

    /// Read the stored config. `Ok(None)` when nothing is stored yet.
    ///
    /// Runs before logging is set up, so problems are returned, not logged.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let stored = storage()?.get_item(STORAGE_KEY).map_err(|_| ConfigError::NoStorage)?;
        Self::from_stored(stored.as_deref())
    }

    fn from_stored(content: Option<&str>) -> Result<Option<Self>, ConfigError> {
        content.map(Self::parse).transpose()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let json = serde_json::to_string(self)?;
        storage()?
            .set_item(STORAGE_KEY, &json)
            .map_err(|_| ConfigError::NoStorage)
    }

    /// Base URL for the API client: `api_base`, or the page origin
    pub fn resolved_api_base(&self) -> String {
        if !self.api_base.trim().is_empty() {
            return self.api_base.trim().to_string();
        }
        web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default()
    }
}

fn storage() -> Result<web_sys::Storage, ConfigError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or(ConfigError::NoStorage)
}
