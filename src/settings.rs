//! Library settings, loadable from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Runtime settings for the templating layer.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Create a missing content item on first lookup (default: false).
    ///
    /// The create-on-miss path is not guarded against concurrent identical
    /// lookups; under a racing pair of requests the first insert wins and a
    /// duplicate may be created unless the store enforces name uniqueness.
    pub auto_create_content_items: bool,

    /// Base path for admin edit URLs (default: "/admin").
    pub admin_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_create_content_items: false,
            admin_base_url: "/admin".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables.
    pub fn from_env() -> Result<Self> {
        let auto_create_content_items = env::var("FILAMENT_AUTO_CREATE_CONTENT_ITEMS")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .context("FILAMENT_AUTO_CREATE_CONTENT_ITEMS must be 'true' or 'false'")?;

        let admin_base_url =
            env::var("FILAMENT_ADMIN_BASE_URL").unwrap_or_else(|_| "/admin".to_string());

        Ok(Self {
            auto_create_content_items,
            admin_base_url,
        })
    }
}
