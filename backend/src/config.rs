//! # Studio Configuration
//!
//! A single YAML file at the root of the data directory.
//!
//! ```text
//! data/
//! ├── studio_config.yaml   ← This module manages this file
//! └── storage.json
//! ```
//!
//! ```yaml
//! admin_email: "admin@flowsyndicate.pl"
//! default_locale: "pl"
//! financial_window_days: 30
//! ```
//!
//! The data directory itself comes from `STUDIO_DATA_DIR` or the platform data
//! directory. `STUDIO_ADMIN_EMAIL` overrides the file's admin email.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::session_store::DEFAULT_ADMIN_EMAIL;
use crate::domain::admin_store::{DEFAULT_FINANCIAL_WINDOW_DAYS, MAX_FINANCIAL_WINDOW_DAYS};

pub const CONFIG_FILE_NAME: &str = "studio_config.yaml";
pub const DATA_DIR_ENV: &str = "STUDIO_DATA_DIR";
pub const ADMIN_EMAIL_ENV: &str = "STUDIO_ADMIN_EMAIL";

/// Interface language. Unknown codes fall back to English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Locale {
    #[default]
    En,
    Pl,
    Ru,
}

impl Locale {
    pub const FALLBACK: Locale = Locale::En;

    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "en" => Locale::En,
            "pl" => Locale::Pl,
            "ru" => Locale::Ru,
            other => {
                debug!("Unknown locale '{}', using {}", other, Self::FALLBACK.code());
                Self::FALLBACK
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Pl => "pl",
            Locale::Ru => "ru",
        }
    }
}

impl From<String> for Locale {
    fn from(code: String) -> Self {
        Locale::from_code(&code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Where storage and this file live; never read from the file itself
    #[serde(skip)]
    pub data_directory: PathBuf,
    pub admin_email: String,
    pub default_locale: Locale,
    pub financial_window_days: i64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            default_locale: Locale::default(),
            financial_window_days: DEFAULT_FINANCIAL_WINDOW_DAYS,
        }
    }
}

/// Platform data directory, e.g. `~/.local/share/Studio` on Linux
pub fn default_data_directory() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("Studio")
}

impl StudioConfig {
    /// Load configuration using the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Load configuration with a custom environment lookup
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_directory = lookup(DATA_DIR_ENV)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_directory);

        let mut config = Self::load_or_create(&data_directory)?;
        config.apply_env(lookup);
        Ok(config)
    }

    /// Read the config file in `data_directory`, writing defaults if it doesn't exist
    pub fn load_or_create(data_directory: &Path) -> Result<Self> {
        let config_path = data_directory.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let config = Self::from_yaml_str(&yaml_content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))?;
            debug!("Loaded config from {:?}", config_path);
            config
        } else {
            let config = StudioConfig {
                data_directory: data_directory.to_path_buf(),
                ..StudioConfig::default()
            };
            config.save()?;
            info!("Created default config at {:?}", config_path);
            config
        };

        config.data_directory = data_directory.to_path_buf();
        Ok(config)
    }

    /// Parse YAML, normalizing values that would break the stores
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut config: StudioConfig = if yaml.trim().is_empty() {
            StudioConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };

        if config.admin_email.trim().is_empty() {
            warn!("Empty admin_email in config, using {}", DEFAULT_ADMIN_EMAIL);
            config.admin_email = DEFAULT_ADMIN_EMAIL.to_string();
        }
        if !(1..=MAX_FINANCIAL_WINDOW_DAYS).contains(&config.financial_window_days) {
            warn!(
                "financial_window_days must be between 1 and {}, got {}; using {}",
                MAX_FINANCIAL_WINDOW_DAYS, config.financial_window_days, DEFAULT_FINANCIAL_WINDOW_DAYS
            );
            config.financial_window_days = DEFAULT_FINANCIAL_WINDOW_DAYS;
        }
        Ok(config)
    }

    /// Apply environment overrides on top of file values
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(email) = lookup(ADMIN_EMAIL_ENV).filter(|email| !email.trim().is_empty()) {
            debug!("Admin email overridden by {}", ADMIN_EMAIL_ENV);
            self.admin_email = email.trim().to_string();
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_directory.join(CONFIG_FILE_NAME)
    }

    /// Write the config file atomically, creating the data directory if needed
    pub fn save(&self) -> Result<()> {
        if !self.data_directory.exists() {
            fs::create_dir_all(&self.data_directory).with_context(|| {
                format!("Failed to create data directory {}", self.data_directory.display())
            })?;
            info!("Created data directory: {:?}", self.data_directory);
        }

        let config_path = self.config_path();
        let yaml_content = serde_yaml::to_string(self)?;

        // Atomic write using temp file
        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &config_path)
            .with_context(|| format!("Failed to replace {}", config_path.display()))?;

        debug!("Saved config to {:?}", config_path);
        Ok(())
    }
}
