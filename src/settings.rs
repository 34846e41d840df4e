//! Runtime configuration read from `config.ron` in the user's config directory.
//!
//! Every field has a default; a missing or malformed file falls back to them.

use bevy::log::{info, warn};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::motion::config::constants::VIEWPORT_THRESHOLD;
use crate::motion::config::is_valid_threshold;
use crate::persistence::STORAGE_KEY;

#[cfg(not(target_arch = "wasm32"))]
const CONFIG_FILE: &str = "config.ron";
const REVEAL_FONT_SIZE_DEFAULT: f32 = 48.0;

pub struct SettingsPlugin;
impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app
            .insert_resource(AppConfig::load())
            ;
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Key the store snapshot is saved under.
    pub storage_key: String,
    /// Visible fraction at which viewport-triggered reveals start.
    pub viewport_threshold: f32,
    pub reveal_font_size: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            viewport_threshold: VIEWPORT_THRESHOLD,
            reveal_font_size: REVEAL_FONT_SIZE_DEFAULT,
        }
    }
}

impl AppConfig {
    pub fn from_ron(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn load() -> Self {
        let Some(path) = dirs::config_dir().map(|p| p.join(crate::persistence::CONFIG_DIR_NAME).join(CONFIG_FILE)) else {
            warn!("No config directory available, using default settings");
            return Self::default();
        };
        if !path.exists() {
            info!("No config at {}, using default settings", path.display());
            return Self::default();
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_ron(&content) {
            Ok(config) => {
                info!("Loaded settings from {}", path.display());
                config.sanitized()
            }
            Err(e) => {
                warn!("Ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn load() -> Self {
        info!("Using default settings");
        Self::default()
    }

    /// Replaces out-of-range values with their defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.storage_key.trim().is_empty() {
            warn!("Empty storage_key in settings, using '{}'", defaults.storage_key);
            self.storage_key = defaults.storage_key;
        }
        if !is_valid_threshold(self.viewport_threshold) {
            warn!("viewport_threshold {} outside (0, 1], using {}", self.viewport_threshold, defaults.viewport_threshold);
            self.viewport_threshold = defaults.viewport_threshold;
        }
        if !self.reveal_font_size.is_finite() || self.reveal_font_size <= 0.0 {
            warn!("Invalid reveal_font_size {}, using {}", self.reveal_font_size, defaults.reveal_font_size);
            self.reveal_font_size = defaults.reveal_font_size;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::RevealConfig;

    #[test]
    fn partial_ron_keeps_remaining_defaults() {
        let config = AppConfig::from_ron("(viewport_threshold: 0.5)").unwrap();

        assert_eq!(config.viewport_threshold, 0.5);
        assert_eq!(config.storage_key, STORAGE_KEY);
        assert_eq!(config.reveal_font_size, REVEAL_FONT_SIZE_DEFAULT);
    }

    #[test]
    fn malformed_ron_is_an_error() {
        assert!(AppConfig::from_ron("(viewport_threshold: \"high\")").is_err());
    }

    #[test]
    fn sanitize_replaces_out_of_range_values() {
        let config = AppConfig {
            storage_key: "  ".into(),
            viewport_threshold: 1.5,
            reveal_font_size: -3.0,
        }
        .sanitized();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn zero_threshold_falls_back_to_a_usable_one() {
        let config = AppConfig::from_ron("(viewport_threshold: 0.0)").unwrap().sanitized();

        assert_eq!(config.viewport_threshold, VIEWPORT_THRESHOLD);
        let reveal = RevealConfig::split("AI Vision").with_viewport_threshold(config.viewport_threshold);
        assert!(reveal.validate().is_ok());
    }
}
