use tracing::{info, warn};

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

/// Backend that enables each driver before stepping and disables it after.
///
/// Pan and tilt are servo driven; tilt is clamped to the servo's travel.
/// A height request equal to the current height is refused unless the
/// configuration says otherwise.
pub struct DriverEnabledBackend {
    core: MotionCore,
    config: HardwareConfig,
    axes: HardwareAxes,
}

impl DriverEnabledBackend {
    pub fn new(config: HardwareConfig, axes: HardwareAxes) -> Self {
        info!("Driver-enabled movement backend initialized");
        Self {
            core: MotionCore::new(),
            config,
            axes,
        }
    }

    fn rejects_unchanged_height(&self) -> bool {
        self.config.reject_unchanged_height.unwrap_or(true)
    }

    async fn move_axis(&mut self, axis: AxisId, target: f64) -> ExecutionResult {
        if self.core.position.get(axis) == target {
            return Ok(SUCCESS);
        }
        let motor = self
            .axes
            .motor(axis)
            .ok_or(CommandError::BackendUnavailable)?;
        drive_axis(&mut self.core, axis, motor, target, true).await
    }
}

#[async_trait::async_trait]
impl MovementBackend for DriverEnabledBackend {
    fn name(&self) -> &str {
        "driver_enabled"
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
        if z == self.core.position.z && self.rejects_unchanged_height() {
            warn!("Height {} already reached, nothing to move", z);
            return Err(CommandError::BackendUnavailable);
        }
        self.move_axis(AxisId::Z, z).await
    }

    async fn move_to_max_height(&mut self) -> ExecutionResult {
        let motor = self
            .axes
            .motor(AxisId::Z)
            .ok_or(CommandError::BackendUnavailable)?;
        let timing = &self.config.timing;
        home_height(
            &mut self.core,
            motor,
            timing.max_height,
            timing.max_height_settle(),
            true,
        )
        .await
    }

    async fn turn_horizontal(&mut self, angle: f64) -> ExecutionResult {
        let servo = self
            .axes
            .servo(AxisId::Pan)
            .ok_or(CommandError::BackendUnavailable)?;
        let settle = self.config.timing.turn_settle();
        turn_servo(&mut self.core, AxisId::Pan, servo, angle, settle).await
    }

    async fn turn_vertical(&mut self, angle: f64) -> ExecutionResult {
        let servo = self
            .axes
            .servo(AxisId::Tilt)
            .ok_or(CommandError::BackendUnavailable)?;
        let clamped = servo.config.clamp(angle);
        if clamped != angle {
            info!("Vertical angle {} clamped to {}", angle, clamped);
        }
        let settle = self.config.timing.turn_settle();
        turn_servo(&mut self.core, AxisId::Tilt, servo, clamped, settle).await
    }
}
