use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServoConfig {
    pub pin: u8,
    #[serde(default = "default_min_angle")]
    pub min_angle: f64,
    #[serde(default = "default_max_angle")]
    pub max_angle: f64,
}

fn default_min_angle() -> f64 {
    0.0
}

fn default_max_angle() -> f64 {
    180.0
}

impl ServoConfig {
    pub fn new(pin: u8) -> Self {
        Self {
            pin,
            min_angle: default_min_angle(),
            max_angle: default_max_angle(),
        }
    }

    /// Limits `angle` to the mechanical travel of the servo.
    pub fn clamp(&self, angle: f64) -> f64 {
        angle.clamp(self.min_angle, self.max_angle)
    }
}

/// Angle-holding actuator driving the pan or tilt plane.
#[async_trait::async_trait]
pub trait ServoDriver: Send + Sync {
    fn name(&self) -> &str;

    async fn set_angle(&self, degrees: f64) -> Result<()>;
}

pub struct DryRunServo {
    name: String,
    config: ServoConfig,
}

impl DryRunServo {
    pub fn new(name: impl Into<String>, config: ServoConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

#[async_trait::async_trait]
impl ServoDriver for DryRunServo {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_angle(&self, degrees: f64) -> Result<()> {
        debug!("{} (pin {}): angle {}", self.name, self.config.pin, degrees);
        Ok(())
    }
}
