use tracing::info;

use super::{
    config::HardwareConfig,
    hardware::{drive_axis, home_height, turn_servo, HardwareAxes},
    progress::ProgressReporter,
    shared::MotionCore,
    MovementBackend,
};
use crate::{
    axis::{position::Position, AxisId},
    protocol::error::{CommandError, ExecutionResult, SUCCESS},
};

/// Backend issuing one synchronous step command per axis.
///
/// Only axes wired with an enable line are enabled/disabled around the move;
/// the rest are stepped directly. Angles are applied without clamping.
pub struct DirectStepBackend {
    core: MotionCore,
    config: HardwareConfig,
    axes: HardwareAxes,
}

impl DirectStepBackend {
    pub fn new(config: HardwareConfig, axes: HardwareAxes) -> Self {
        info!("Direct-step movement backend initialized");
        Self {
            core: MotionCore::new(),
            config,
            axes,
        }
    }

    async fn move_axis(&mut self, axis: AxisId, target: f64) -> ExecutionResult {
        if self.core.position.get(axis) == target {
            return Ok(SUCCESS);
        }
        let motor = self
            .axes
            .motor(axis)
            .ok_or(CommandError::BackendUnavailable)?;
        let bracket = motor.config.enable_pin.is_some();
        drive_axis(&mut self.core, axis, motor, target, bracket).await
    }

    async fn turn(&mut self, axis: AxisId, angle: f64) -> ExecutionResult {
        let settle = self.config.timing.turn_settle();
        match self.axes.servo(axis) {
            Some(servo) => turn_servo(&mut self.core, axis, servo, angle, settle).await,
            None => self.core.settle_then_set(axis, angle, settle).await,
        }
    }
}

#[async_trait::async_trait]
impl MovementBackend for DirectStepBackend {
    fn name(&self) -> &str {
        "direct_step"
    }

    fn position(&self) -> Position {
        self.core.position
    }

    async fn stop_all(&mut self) {
        self.axes.stop_all().await;
    }

    async fn move_to_xy(
        &mut self,
        x: f64,
        y: f64,
        _progress: &mut dyn ProgressReporter,
    ) -> ExecutionResult {
        self.move_axis(AxisId::X, x).await?;
        self.move_axis(AxisId::Y, y).await
    }

    async fn move_to_height(
        &mut self,
        z: f64,
        _progress: &mut dyn ProgressReporter,
    ) -> ExecutionResult {
        if self.config.reject_unchanged_height.unwrap_or(false) && z == self.core.position.z {
            return Err(CommandError::BackendUnavailable);
        }
        self.move_axis(AxisId::Z, z).await
    }

    async fn move_to_max_height(&mut self) -> ExecutionResult {
        let motor = self
            .axes
            .motor(AxisId::Z)
            .ok_or(CommandError::BackendUnavailable)?;
        let bracket = motor.config.enable_pin.is_some();
        let timing = &self.config.timing;
        home_height(
            &mut self.core,
            motor,
            timing.max_height,
            timing.max_height_settle(),
            bracket,
        )
        .await
    }

    async fn turn_horizontal(&mut self, angle: f64) -> ExecutionResult {
        self.turn(AxisId::Pan, angle).await
    }

    async fn turn_vertical(&mut self, angle: f64) -> ExecutionResult {
        self.turn(AxisId::Tilt, angle).await
    }
}
