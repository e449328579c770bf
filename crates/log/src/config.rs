use std::path::Path;

use flightlog_grid::FormatVersion;
use flightlog_path::OvershootPolicy;
use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Decode-time parameters, resolved once per decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Inset convention of the logs being read.
    pub format_version: FormatVersion,
    /// World-space cell edge; `None` fits the largest axis into one unit.
    pub cell_size: Option<f64>,
    /// Treatment of an END at or past the last recorded move.
    pub overshoot: OvershootPolicy,
    /// Keep block boxes inside the grid by dropping the outward insets of
    /// edge cells. Decoded descriptors are never altered.
    pub clamp_boundary: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            format_version: FormatVersion::RatioInset,
            cell_size: None,
            overshoot: OvershootPolicy::Keep,
            clamp_boundary: true,
        }
    }
}

/// Limits applied when validating a submitted map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Largest allowed extent on any axis, inclusive.
    pub max_width: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { max_width: 25 }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightlogConfig {
    pub decode: DecodeConfig,
    pub validation: ValidationConfig,
}

impl FlightlogConfig {
    pub fn from_json_str(text: &str) -> Result<Self, LogError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let cfg = FlightlogConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, FlightlogConfig::default());
        assert!(cfg.decode.clamp_boundary);
        assert_eq!(cfg.validation.max_width, 25);
    }

    #[test]
    fn partial_override() {
        let cfg = FlightlogConfig::from_json_str(
            r#"{"decode": {"format_version": "raw_inset", "overshoot": "stamp"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.decode.format_version, FormatVersion::RawInset);
        assert_eq!(cfg.decode.overshoot, OvershootPolicy::Stamp);
        assert_eq!(cfg.decode.cell_size, None);
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("flightlog.json");
        std::fs::write(&path, r#"{"validation": {"max_width": 40}}"#).unwrap();
        let cfg = FlightlogConfig::load(&path).unwrap();
        assert_eq!(cfg.validation.max_width, 40);
    }

    #[test]
    fn malformed_config_is_config_error() {
        let err = FlightlogConfig::from_json_str("{\"decode\": 3}").unwrap_err();
        assert!(matches!(err, LogError::Config(_)));
    }
}
