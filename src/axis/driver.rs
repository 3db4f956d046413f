use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Wiring and calibration of one stepper axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub steps_per_revolution: u32,
    pub dir_pin: u8,
    pub step_pin: u8,
    #[serde(default)]
    pub enable_pin: Option<u8>,
    /// Configured speed in RPM.
    pub speed_rpm: f64,
    /// Steps needed to travel one distance unit. Depends on the motor and gearing.
    #[serde(default = "default_steps_per_unit")]
    pub steps_per_unit: f64,
    #[serde(default = "default_enable_active_low")]
    pub enable_active_low: bool,
}

fn default_steps_per_unit() -> f64 {
    1.0
}

fn default_enable_active_low() -> bool {
    true
}

impl DriverConfig {
    pub fn new(dir_pin: u8, step_pin: u8) -> Self {
        Self {
            steps_per_revolution: 200,
            dir_pin,
            step_pin,
            enable_pin: None,
            speed_rpm: 70.0,
            steps_per_unit: default_steps_per_unit(),
            enable_active_low: default_enable_active_low(),
        }
    }

    pub fn with_enable_pin(mut self, pin: u8) -> Self {
        self.enable_pin = Some(pin);
        self
    }

    pub fn with_speed(mut self, rpm: f64) -> Self {
        self.speed_rpm = rpm;
        self
    }

    pub fn with_steps_per_unit(mut self, steps: f64) -> Self {
        self.steps_per_unit = steps;
        self
    }

    /// Signed step count needed to go from `current` to `target`, or `None`
    /// when the move cannot be expressed as a single step command.
    pub fn steps_between(&self, current: f64, target: f64) -> Option<i64> {
        let steps = ((target - current) * self.steps_per_unit).round();
        (steps.is_finite() && steps.abs() < i64::MAX as f64).then_some(steps as i64)
    }

    /// Wall-clock time for `steps` at the configured speed.
    pub fn travel_time(&self, steps: i64) -> Duration {
        let steps_per_second = self.steps_per_revolution as f64 * self.speed_rpm / 60.0;
        if steps_per_second <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(steps.unsigned_abs() as f64 / steps_per_second)
            .unwrap_or(Duration::MAX)
    }
}

/// Step/enable/disable capability of one motor driver chip.
#[async_trait::async_trait]
pub trait StepperDriver: Send + Sync {
    fn name(&self) -> &str;

    async fn enable(&self) -> Result<()>;
    async fn disable(&self) -> Result<()>;

    /// Blocks until `steps` (signed, direction included) have been issued.
    async fn move_steps(&self, steps: i64) -> Result<()>;

    /// Zeroes the commanded speed.
    async fn stop(&self) -> Result<()>;
}

/// Driver that only logs and waits as long as the real motor would take.
pub struct DryRunStepper {
    name: String,
    config: DriverConfig,
    enabled: AtomicBool,
}

impl DryRunStepper {
    pub fn new(name: impl Into<String>, config: DriverConfig) -> Self {
        let name = name.into();
        info!(
            "Dry-run stepper {}: {} steps/rev, dir pin {}, step pin {}, enable pin {:?}, {} RPM",
            name,
            config.steps_per_revolution,
            config.dir_pin,
            config.step_pin,
            config.enable_pin,
            config.speed_rpm
        );
        Self {
            name,
            config,
            enabled: AtomicBool::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl StepperDriver for DryRunStepper {
    fn name(&self) -> &str {
        &self.name
    }

    async fn enable(&self) -> Result<()> {
        debug!("{}: enable", self.name);
        self.enabled.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn disable(&self) -> Result<()> {
        debug!("{}: disable", self.name);
        self.enabled.store(false, Ordering::Relaxed);
        Ok(())
    }

    async fn move_steps(&self, steps: i64) -> Result<()> {
        let duration = self.config.travel_time(steps);
        debug!("{}: {} steps over {:?}", self.name, steps, duration);
        tokio::time::sleep(duration).await;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        debug!("{}: speed reset", self.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_between_is_signed() {
        let config = DriverConfig::new(8, 9).with_steps_per_unit(10.0);
        assert_eq!(config.steps_between(0.0, 3.0), Some(30));
        assert_eq!(config.steps_between(3.0, 1.5), Some(-15));
        assert_eq!(config.steps_between(2.0, 2.0), Some(0));
    }

    #[test]
    fn test_steps_between_rejects_unrepresentable_moves() {
        let config = DriverConfig::new(8, 9).with_steps_per_unit(10.0);
        assert_eq!(config.steps_between(0.0, 1e30), None);
        assert_eq!(config.steps_between(0.0, -1e30), None);
        assert_eq!(config.steps_between(0.0, f64::INFINITY), None);
    }

    #[test]
    fn test_travel_time_saturates() {
        let config = DriverConfig::new(8, 9).with_speed(1e-300);
        assert_eq!(config.travel_time(i64::MAX), Duration::MAX);
    }

    #[test]
    fn test_travel_time_from_rpm() {
        // 200 steps/rev at 60 RPM is 200 steps per second
        let config = DriverConfig::new(8, 9).with_speed(60.0);
        assert_eq!(config.travel_time(400), Duration::from_secs(2));
        assert_eq!(config.travel_time(-200), Duration::from_secs(1));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let json = r#"{"steps_per_revolution": 200, "dir_pin": 2, "step_pin": 1, "speed_rpm": 70.0}"#;
        let config: DriverConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.enable_pin, None);
        assert_eq!(config.steps_per_unit, 1.0);
        assert!(config.enable_active_low);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dry_run_tracks_enable_state() {
        let stepper = DryRunStepper::new("x", DriverConfig::new(8, 9).with_enable_pin(7));
        stepper.enable().await.unwrap();
        assert!(stepper.is_enabled());
        stepper.move_steps(50).await.unwrap();
        stepper.disable().await.unwrap();
        assert!(!stepper.is_enabled());
    }
}
