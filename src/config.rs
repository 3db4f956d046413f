use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    dispatcher::config::DispatcherConfig, line_server::config::LineServerConfig,
    movement::config::BackendConfig,
};

/// Device profile: which backend drives the device and how the link is served.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GantryConfig {
    pub backend: BackendConfig,
    pub dispatcher: DispatcherConfig,
    pub server: LineServerConfig,
}

impl GantryConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GantryConfig =
            serde_json::from_str(json).context("Failed to parse device profile")?;
        config.backend.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read device profile {}", path.display()))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::config::HardwareConfig;

    #[test]
    fn test_empty_profile_is_simulated() {
        let config = GantryConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GantryConfig::default());
        assert!(matches!(config.backend, BackendConfig::Simulated(_)));
    }

    #[test]
    fn test_profile_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");
        let profile = GantryConfig {
            backend: BackendConfig::DirectStep(HardwareConfig::direct_step()),
            dispatcher: DispatcherConfig { pump_run_ms: 100 },
            ..GantryConfig::default()
        };
        std::fs::write(&path, serde_json::to_string_pretty(&profile).unwrap()).unwrap();

        let loaded = GantryConfig::from_file(&path).unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let json = r#"{"backend": {"kind": "simulated",
            "x": {"increment": 0.0, "millis_per_unit": 50.0},
            "y": {"increment": 10.0, "millis_per_unit": 100.0},
            "z": {"increment": 5.0, "millis_per_unit": 50.0}}}"#;
        assert!(GantryConfig::from_json_str(json).is_err());
        assert!(GantryConfig::from_json_str(r#"{"backend": {"kind": "warp"}}"#).is_err());
    }
}
