//! User configuration handling

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::diff::DEFAULT_CONTEXT_RADIUS;
use crate::graph::GraphStyle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Context lines kept visible on each side of a folded run
    pub context_radius: usize,
    pub graph: GraphStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            context_radius: DEFAULT_CONTEXT_RADIUS,
            graph: GraphStyle::default(),
        }
    }
}

/// Load render configuration from the user's config directory, falling back
/// to defaults when no config file exists.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config() -> anyhow::Result<RenderConfig> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(RenderConfig::default()),
    }
}

/// Load render configuration from `path`; a missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_from(path: &Path) -> anyhow::Result<RenderConfig> {
    if !path.exists() {
        return Ok(RenderConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(config)
}

/// Save render configuration to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn save_config_to(config: &RenderConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(())
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        Path::new(&home).join(".config")
    } else {
        return None;
    };

    Some(base.join("diffweave").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.context_radius, 3);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = RenderConfig::default();
        config.context_radius = 5;
        config.graph.palette = vec!["#000000".to_string()];
        save_config_to(&config, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"graph": {"row_height": 40.0}}"#).unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.context_radius, DEFAULT_CONTEXT_RADIUS);
        assert!((config.graph.row_height - 40.0).abs() < f64::EPSILON);
        assert_eq!(config.graph.palette.len(), 8);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }
}
