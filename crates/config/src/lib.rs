//! Configuration loading for Vega.
//!
//! Provides utilities for locating the shared Vega config directory
//! (~/.config/vega/) and loading TOML and JSON files out of it.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Get the Vega config directory (~/.config/vega/)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("vega"))
}

/// Get the path to a config file within the Vega config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|p| p.join(filename))
}

/// Check if a config file exists in the Vega config directory
pub fn config_exists(filename: &str) -> bool {
    config_path(filename).is_some_and(|p| p.exists())
}

/// Ensure the Vega config directory exists
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().context("Could not determine config directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Load and parse a TOML config file from the Vega config directory
pub fn load_toml<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let path = config_path(filename).context("Could not determine config directory")?;
    load_toml_file(&path)
}

/// Load and parse a TOML file from an arbitrary path
pub fn load_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load and parse a JSON file from an arbitrary path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let dir = config_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().ends_with("vega"));
    }

    #[test]
    fn test_config_path() {
        let path = config_path("config.toml");
        assert!(path.is_some());
        assert!(path.unwrap().ends_with("vega/config.toml"));
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "name = \"vega\"\ncount = 3\n").unwrap();

        #[derive(serde::Deserialize)]
        struct Sample {
            name: String,
            count: u32,
        }

        let sample: Sample = load_toml_file(&path).unwrap();
        assert_eq!(sample.name, "vega");
        assert_eq!(sample.count, 3);
    }

    #[test]
    fn test_load_toml_file_missing() {
        let err = load_toml_file::<toml::Value>(Path::new("/nonexistent/config.toml"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("Failed to read config file"));
    }
}
