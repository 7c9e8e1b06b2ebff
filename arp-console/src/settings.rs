//! Application settings

use std::path::{Path, PathBuf};

use arp_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Settings {
    /// Engine timing and address pool configuration
    #[serde(default)]
    pub engine: EngineConfig,
    /// Where the device database lives; the XDG data directory when unset
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
    /// Print the final snapshot as JSON after a run
    #[serde(default)]
    pub print_json: bool,
}

impl Settings {
    /// Get the XDG config directory for arpsim
    /// Uses $XDG_CONFIG_HOME/arpsim on Linux/macOS, falls back to ~/.config/arpsim
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("arpsim"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("arpsim"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, writing the defaults on first run
    pub fn load_or_init() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine settings path, using defaults");
            return Self::default();
        };

        if path.exists() {
            return Self::load_from(&path);
        }

        let settings = Self::default();
        if let Err(e) = settings.save_to(&path) {
            warn!("Failed to write default settings: {}", e);
        }
        settings
    }

    /// Load settings from a file; missing or malformed files yield defaults
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| match serde_json::from_str(&s) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    warn!("Ignoring malformed settings at {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Save settings to a file
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create settings directory: {}", e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        std::fs::write(path, json).map_err(|e| format!("Failed to write settings: {}", e))?;
        debug!("Settings written to {}", path.display());

        Ok(())
    }
}
