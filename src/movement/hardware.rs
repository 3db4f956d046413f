use std::time::Duration;

use tracing::{debug, warn};

use super::{config::HardwareConfig, shared::MotionCore};
use crate::{
    axis::{
        driver::{DriverConfig, DryRunStepper, StepperDriver},
        servo::{DryRunServo, ServoConfig, ServoDriver},
        AxisId,
    },
    protocol::error::{CommandError, ExecutionResult},
};

pub struct AxisMotor {
    pub driver: Box<dyn StepperDriver>,
    pub config: DriverConfig,
}

pub struct AngleServo {
    pub driver: Box<dyn ServoDriver>,
    pub config: ServoConfig,
}

/// The drivers actually fitted to a device.
#[derive(Default)]
pub struct HardwareAxes {
    pub x: Option<AxisMotor>,
    pub y: Option<AxisMotor>,
    pub z: Option<AxisMotor>,
    pub pan: Option<AngleServo>,
    pub tilt: Option<AngleServo>,
}

impl HardwareAxes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dry-run drivers for every axis present in `config`.
    pub fn dry_run(config: &HardwareConfig) -> Self {
        let motor = |axis: AxisId, cfg: &Option<DriverConfig>| {
            cfg.as_ref().map(|cfg| {
                let driver: Box<dyn StepperDriver> =
                    Box::new(DryRunStepper::new(axis.name(), cfg.clone()));
                AxisMotor {
                    driver,
                    config: cfg.clone(),
                }
            })
        };
        let servo = |axis: AxisId, cfg: &Option<ServoConfig>| {
            cfg.as_ref().map(|cfg| {
                let driver: Box<dyn ServoDriver> =
                    Box::new(DryRunServo::new(axis.name(), cfg.clone()));
                AngleServo {
                    driver,
                    config: cfg.clone(),
                }
            })
        };

        Self {
            x: motor(AxisId::X, &config.x),
            y: motor(AxisId::Y, &config.y),
            z: motor(AxisId::Z, &config.z),
            pan: servo(AxisId::Pan, &config.pan),
            tilt: servo(AxisId::Tilt, &config.tilt),
        }
    }

    pub fn with_stepper(
        mut self,
        axis: AxisId,
        driver: impl StepperDriver + 'static,
        config: DriverConfig,
    ) -> Self {
        let motor = Some(AxisMotor {
            driver: Box::new(driver),
            config,
        });
        match axis {
            AxisId::X => self.x = motor,
            AxisId::Y => self.y = motor,
            AxisId::Z => self.z = motor,
            AxisId::Pan | AxisId::Tilt => warn!("Axis {} is not a stepper axis", axis),
        }
        self
    }

    pub fn with_servo(
        mut self,
        axis: AxisId,
        driver: impl ServoDriver + 'static,
        config: ServoConfig,
    ) -> Self {
        let servo = Some(AngleServo {
            driver: Box::new(driver),
            config,
        });
        match axis {
            AxisId::Pan => self.pan = servo,
            AxisId::Tilt => self.tilt = servo,
            _ => warn!("Axis {} is not a servo axis", axis),
        }
        self
    }

    pub fn motor(&self, axis: AxisId) -> Option<&AxisMotor> {
        match axis {
            AxisId::X => self.x.as_ref(),
            AxisId::Y => self.y.as_ref(),
            AxisId::Z => self.z.as_ref(),
            AxisId::Pan | AxisId::Tilt => None,
        }
    }

    pub fn servo(&self, axis: AxisId) -> Option<&AngleServo> {
        match axis {
            AxisId::Pan => self.pan.as_ref(),
            AxisId::Tilt => self.tilt.as_ref(),
            _ => None,
        }
    }

    /// Zeroes speed on every fitted stepper. Driver errors are logged, never returned.
    pub async fn stop_all(&self) {
        for (axis, motor) in [
            (AxisId::X, &self.x),
            (AxisId::Y, &self.y),
            (AxisId::Z, &self.z),
        ] {
            if let Some(motor) = motor {
                if let Err(e) = motor.driver.stop().await {
                    warn!("Failed to stop axis {}: {}", axis, e);
                }
            }
        }
    }
}

/// Moves one stepper axis to `target` in a single step command.
///
/// With `bracket` set the driver is enabled before and disabled after the move.
/// The stored coordinate changes only if no fault was raised.
pub(crate) async fn drive_axis(
    core: &mut MotionCore,
    axis: AxisId,
    motor: &AxisMotor,
    target: f64,
    bracket: bool,
) -> ExecutionResult {
    let current = core.position.get(axis);
    let Some(steps) = motor.config.steps_between(current, target) else {
        warn!("{}: {} -> {} does not fit one step command", axis, current, target);
        return Err(CommandError::InvalidParameters);
    };
    debug!("{}: {} -> {} ({} steps)", axis, current, target, steps);

    core.begin_operation();

    if bracket {
        let result = motor.driver.enable().await;
        core.check(axis, result);
    }

    if !core.movement_error() {
        let result = motor.driver.move_steps(steps).await;
        core.check(axis, result);
    }

    if bracket {
        if let Err(e) = motor.driver.disable().await {
            warn!("Failed to disable axis {}: {}", axis, e);
        }
    }

    core.commit(axis, target)
}

/// Homing stand-in: drive the height axis to the calibrated maximum, let it
/// settle and report the reached height.
pub(crate) async fn home_height(
    core: &mut MotionCore,
    motor: &AxisMotor,
    max_height: f64,
    settle: Duration,
    bracket: bool,
) -> ExecutionResult {
    drive_axis(core, AxisId::Z, motor, max_height, bracket).await?;
    tokio::time::sleep(settle).await;
    core.position.z = max_height;
    Ok(core.position.z as i32)
}

/// Points a servo at `angle`, waits for it to settle and records the angle.
pub(crate) async fn turn_servo(
    core: &mut MotionCore,
    axis: AxisId,
    servo: &AngleServo,
    angle: f64,
    settle: Duration,
) -> ExecutionResult {
    core.begin_operation();
    let result = servo.driver.set_angle(angle).await;
    core.check(axis, result);
    if core.movement_error() {
        return Err(CommandError::GenericMovement);
    }
    tokio::time::sleep(settle).await;
    core.commit(axis, angle)
}
