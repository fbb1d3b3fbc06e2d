//! Configuration file support
//!
//! Settings can be kept in a TOML file and passed with `--config`. Any flag
//! given on the command line overrides the file.
//!
//! ```toml
//! [warp]
//! tolerance = 25
//!
//! [export]
//! include_global_time = true
//! sort_output = true
//!
//! [monitor]
//! interval_secs = 5
//! ```

use crate::error::{InspectError, Result};
use crate::export::ExportConfig;
use crate::warp::WarpConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default seconds between monitor refreshes
pub const DEFAULT_INTERVAL_SECS: u64 = 2;

/// Polling settings for the monitor view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub interval_secs: u64,
    /// Stop after this many refreshes (None = run until interrupted)
    pub iterations: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            iterations: None,
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// All settings, as read from a config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InspectConfig {
    pub warp: WarpConfig,
    pub export: ExportConfig,
    pub monitor: MonitorConfig,
}

impl InspectConfig {
    /// Parse TOML text
    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let config_err = |reason: String| InspectError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        Self::from_toml(&text).map_err(|e| config_err(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InspectConfig::default();
        assert_eq!(config.warp.tolerance, 10);
        assert_eq!(config.warp.scan_limit, None);
        assert!(!config.export.include_global_time);
        assert!(!config.export.sort_output);
        assert_eq!(config.monitor.interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_file() {
        let config = InspectConfig::from_toml("[warp]\ntolerance = 25\n").unwrap();
        assert_eq!(config.warp.tolerance, 25);
        assert_eq!(config.monitor, MonitorConfig::default());
    }

    #[test]
    fn test_full_file() {
        let text = r#"
[warp]
tolerance = 3
scan_limit = 1000

[export]
include_global_time = true
sort_output = true

[monitor]
interval_secs = 5
iterations = 10
"#;
        let config = InspectConfig::from_toml(text).unwrap();
        assert_eq!(config.warp.scan_limit, Some(1000));
        assert!(config.export.include_global_time);
        assert!(config.export.sort_output);
        assert_eq!(config.monitor.iterations, Some(10));
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(InspectConfig::from_toml("[plot]\nenabled = true\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = InspectConfig::load(Path::new("/nonexistent/daqinspect.toml")).unwrap_err();
        assert!(matches!(err, InspectError::Config { .. }));
    }
}
