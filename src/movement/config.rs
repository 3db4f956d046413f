use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::axis::{driver::DriverConfig, servo::ServoConfig};

/// Sub-step size and pacing of one simulated axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncrementConfig {
    /// Distance covered between two progress snapshots.
    pub increment: f64,
    /// Simulated travel time per distance unit.
    pub millis_per_unit: f64,
}

impl IncrementConfig {
    pub fn new(increment: f64, millis_per_unit: f64) -> Self {
        Self {
            increment,
            millis_per_unit,
        }
    }

    pub fn pace(&self, distance: f64) -> Duration {
        Duration::try_from_secs_f64((distance.abs() * self.millis_per_unit / 1000.0).max(0.0))
            .unwrap_or(Duration::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Calibrated height reached by the homing move.
    pub max_height: f64,
    pub max_height_settle_ms: u64,
    pub turn_settle_ms: u64,
}

impl TimingConfig {
    pub fn max_height_settle(&self) -> Duration {
        Duration::from_millis(self.max_height_settle_ms)
    }

    pub fn turn_settle(&self) -> Duration {
        Duration::from_millis(self.turn_settle_ms)
    }

    /// The homing height is reported as an integer result code, so it has to fit one.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_height.is_finite() && self.max_height.abs() <= i32::MAX as f64) {
            bail!("Max height {} is out of range", self.max_height);
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            max_height: 15.0,
            max_height_settle_ms: 4000,
            turn_settle_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedConfig {
    pub x: IncrementConfig,
    pub y: IncrementConfig,
    pub z: IncrementConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            x: IncrementConfig::new(5.0, 50.0),
            y: IncrementConfig::new(10.0, 100.0),
            z: IncrementConfig::new(5.0, 50.0),
            timing: TimingConfig::default(),
        }
    }
}

/// Wiring of a stepper/servo device. Absent axes are simply not fitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HardwareConfig {
    pub x: Option<DriverConfig>,
    pub y: Option<DriverConfig>,
    pub z: Option<DriverConfig>,
    pub pan: Option<ServoConfig>,
    pub tilt: Option<ServoConfig>,
    #[serde(default)]
    pub timing: TimingConfig,
    /// Whether a height request equal to the current height is refused.
    /// When unset the variant's own policy applies.
    #[serde(default)]
    pub reject_unchanged_height: Option<bool>,
}

impl HardwareConfig {
    /// Board with an enable line on x only; y and z are driven directly.
    pub fn direct_step() -> Self {
        Self {
            x: Some(DriverConfig::new(8, 9).with_enable_pin(7)),
            y: Some(DriverConfig::new(2, 1)),
            z: Some(DriverConfig::new(2, 1)),
            ..Self::default()
        }
    }

    /// Board with enable lines on both gantry axes.
    pub fn driver_enabled() -> Self {
        Self {
            x: Some(DriverConfig::new(8, 9).with_enable_pin(7).with_speed(200.0)),
            y: Some(DriverConfig::new(5, 6).with_enable_pin(4).with_speed(200.0)),
            z: Some(DriverConfig::new(0, 1)),
            ..Self::default()
        }
    }
}

/// Which movement backend drives the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    Simulated(SimulatedConfig),
    DirectStep(HardwareConfig),
    DriverEnabled(HardwareConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Simulated(SimulatedConfig::default())
    }
}

impl BackendConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            BackendConfig::Simulated(sim) => {
                for (axis, inc) in [("x", &sim.x), ("y", &sim.y), ("z", &sim.z)] {
                    if !(inc.increment.is_finite() && inc.increment > 0.0) {
                        bail!("Increment for axis {} must be positive", axis);
                    }
                    if !(inc.millis_per_unit.is_finite() && inc.millis_per_unit >= 0.0) {
                        bail!("Pace for axis {} must be non-negative", axis);
                    }
                }
                sim.timing.validate()?;
            }
            BackendConfig::DirectStep(hw) | BackendConfig::DriverEnabled(hw) => {
                for (axis, driver) in [("x", &hw.x), ("y", &hw.y), ("z", &hw.z)] {
                    if let Some(driver) = driver {
                        if driver.steps_per_revolution == 0 {
                            bail!("Axis {} needs a non-zero steps per revolution", axis);
                        }
                        if !(driver.steps_per_unit.is_finite() && driver.steps_per_unit > 0.0) {
                            bail!("Axis {} needs positive steps per unit", axis);
                        }
                        if !(driver.speed_rpm.is_finite() && driver.speed_rpm > 0.0) {
                            bail!("Axis {} needs a positive speed", axis);
                        }
                    }
                }
                hw.timing.validate()?;
                for (axis, servo) in [("pan", &hw.pan), ("tilt", &hw.tilt)] {
                    if let Some(servo) = servo {
                        if servo.min_angle > servo.max_angle {
                            bail!("Servo {} has an empty angle range", axis);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
