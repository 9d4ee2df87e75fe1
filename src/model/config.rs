use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from config.toml in the data directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Slot key holding the task array
    #[serde(default = "default_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig { key: default_key() }
    }
}

fn default_key() -> String {
    "todos".into()
}

/// Light or dark palette
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
}

impl ThemeName {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Light => "light",
            ThemeName::Dark => "dark",
        }
    }

    pub fn toggled(self) -> ThemeName {
        match self {
            ThemeName::Light => ThemeName::Dark,
            ThemeName::Dark => ThemeName::Light,
        }
    }

    pub fn parse_theme(s: &str) -> Option<ThemeName> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Some(ThemeName::Light),
            "dark" => Some(ThemeName::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: ThemeName,
    /// Seconds before a notification dismisses itself
    #[serde(default = "default_toast_seconds")]
    pub toast_seconds: u64,
    /// Hex overrides for palette entries, keyed by palette field name
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Hex overrides for category badges, keyed by category
    #[serde(default)]
    pub category_colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            theme: ThemeName::default(),
            toast_seconds: default_toast_seconds(),
            colors: HashMap::new(),
            category_colors: HashMap::new(),
        }
    }
}

fn default_toast_seconds() -> u64 {
    3
}
