//! Editor configuration.

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::snap::{GridConfig, MIN_GRID_SIZE};
use crate::tools::ToolOptions;
use crate::viewport::{MAX_ZOOM, MIN_ZOOM};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for the interaction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub grid: GridConfig,
    /// Rectangles and circles smaller than this on either side are discarded.
    pub min_shape_size: f64,
    /// Lines and arrows shorter than this are discarded.
    pub min_line_length: f64,
    /// Hit-test tolerance in screen pixels.
    pub hit_tolerance: f64,
    pub history_limit: usize,
    /// Offset applied to pasted and duplicated elements.
    pub paste_offset: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Screen padding used by zoom-to-fit.
    pub fit_padding: f64,
    pub tool_options: ToolOptions,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            min_shape_size: 10.0,
            min_line_length: 10.0,
            hit_tolerance: 6.0,
            history_limit: DEFAULT_HISTORY_LIMIT,
            paste_offset: 10.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            fit_padding: 50.0,
            tool_options: ToolOptions::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid.size >= MIN_GRID_SIZE) || !self.grid.size.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "grid size must be at least {}, got {}",
                MIN_GRID_SIZE, self.grid.size
            )));
        }
        if self.grid.magnetic_strength < 0.0 || self.grid.magnetic_radius < 0.0 {
            return Err(ConfigError::Invalid(
                "magnetic strength and radius must not be negative".to_string(),
            ));
        }
        if self.min_shape_size < 0.0 || self.min_line_length < 0.0 || self.hit_tolerance < 0.0 {
            return Err(ConfigError::Invalid(
                "size thresholds and hit tolerance must not be negative".to_string(),
            ));
        }
        if !(self.min_zoom > 0.0) || self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "invalid zoom limits {}..{}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EditorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EditorConfig::from_json(r#"{"min_shape_size": 4, "grid": {"size": 10}}"#).unwrap();
        assert!((config.min_shape_size - 4.0).abs() < f64::EPSILON);
        assert!((config.grid.size - 10.0).abs() < f64::EPSILON);
        assert!((config.grid.magnetic_strength - 25.0).abs() < f64::EPSILON);
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            EditorConfig::from_json(r#"{"grid": {"size": 0}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EditorConfig::from_json(r#"{"grid": {"size": 0.01}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EditorConfig::from_json(r#"{"min_zoom": 5, "max_zoom": 2}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EditorConfig::from_json(r#"{"history_limit": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(EditorConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EditorConfig::load("/nonexistent/sketchboard.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
