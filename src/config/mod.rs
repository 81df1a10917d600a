//! Configuration module for RivalSearch-RS
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Load settings from the first discovered file, falling back to defaults.
///
/// Lookup order: `RIVALSEARCH_SETTINGS_PATH`, then `settings.yml` in the working
/// directory, `config/settings.yml`, `/etc/rivalsearch/settings.yml`, and finally
/// the user config directory. Environment overrides are applied last either way.
pub fn load() -> Result<Settings> {
    if let Ok(path) = std::env::var("RIVALSEARCH_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    let candidates = [
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/rivalsearch/settings.yml"),
        dirs::config_dir()
            .map(|p| p.join("rivalsearch-rs/settings.yml"))
            .unwrap_or_default(),
    ];

    for path in candidates.iter() {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}
