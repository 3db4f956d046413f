use tracing::info;

use super::{
    config::{IncrementConfig, SimulatedConfig},
    progress::ProgressReporter,
    shared::MotionCore,
    MovementBackend,
};
use crate::{
    axis::{
        position::{format_coordinate, Position},
        AxisId,
    },
    protocol::error::{CommandError, ExecutionResult, SUCCESS},
};

/// Backend without motors: moves are played out in fixed increments, each
/// taking simulated travel time and emitting a progress snapshot.
pub struct SimulatedBackend {
    core: MotionCore,
    config: SimulatedConfig,
}

impl SimulatedBackend {
    pub fn new(config: SimulatedConfig) -> Self {
        info!("Simulated movement backend initialized");
        Self {
            core: MotionCore::new(),
            config,
        }
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(SimulatedConfig::default())
    }
}

/// Steps `axis` toward `target` one increment at a time.
///
/// Each stop is measured from the starting coordinate (`start + k * increment`)
/// rather than accumulated, and the last stop is `target` itself. A stop that
/// float spacing would round back onto the current coordinate also jumps to
/// `target`, so every iteration makes progress.
async fn advance_axis(
    core: &mut MotionCore,
    axis: AxisId,
    target: f64,
    increment: &IncrementConfig,
    snapshot: fn(&Position) -> String,
    progress: &mut dyn ProgressReporter,
) {
    let start = core.position.get(axis);
    if start == target {
        return;
    }

    let distance = (target - start).abs();
    let direction = if target > start { 1.0 } else { -1.0 };
    let stride = if increment.increment > 0.0 {
        increment.increment
    } else {
        distance
    };

    let mut count: u64 = 0;
    loop {
        let current = core.position.get(axis);
        count += 1;

        let covered = count as f64 * stride;
        let mut next = if covered >= distance {
            target
        } else {
            start + direction * covered
        };
        if next == current {
            next = target;
        }

        tokio::time::sleep(increment.pace(next - current)).await;
        core.position.set(axis, next);
        progress.report(&snapshot(&core.position));

        if next == target {
            break;
        }
    }
}

#[async_trait::async_trait]
impl MovementBackend for SimulatedBackend {
    fn name(&self) -> &str {
        "simulated"
    }

    fn position(&self) -> Position {
        self.core.position
    }

    async fn stop_all(&mut self) {
        info!("Stopping all motors");
    }

    async fn move_to_xy(
        &mut self,
        x: f64,
        y: f64,
        progress: &mut dyn ProgressReporter,
    ) -> ExecutionResult {
        if !(x.is_finite() && y.is_finite()) {
            return Err(CommandError::InvalidParameters);
        }
        let pos = self.core.position;
        info!(
            "x: {} -> {}, y: {} -> {}",
            format_coordinate(pos.x),
            format_coordinate(x),
            format_coordinate(pos.y),
            format_coordinate(y)
        );

        advance_axis(
            &mut self.core,
            AxisId::X,
            x,
            &self.config.x,
            Position::planar_snapshot,
            progress,
        )
        .await;
        advance_axis(
            &mut self.core,
            AxisId::Y,
            y,
            &self.config.y,
            Position::planar_snapshot,
            progress,
        )
        .await;

        Ok(SUCCESS)
    }

    async fn move_to_height(
        &mut self,
        z: f64,
        progress: &mut dyn ProgressReporter,
    ) -> ExecutionResult {
        if !z.is_finite() {
            return Err(CommandError::InvalidParameters);
        }
        info!(
            "z: {} -> {}",
            format_coordinate(self.core.position.z),
            format_coordinate(z)
        );

        advance_axis(
            &mut self.core,
            AxisId::Z,
            z,
            &self.config.z,
            Position::height_snapshot,
            progress,
        )
        .await;

        Ok(SUCCESS)
    }

    async fn move_to_max_height(&mut self) -> ExecutionResult {
        info!("Going to max height");
        tokio::time::sleep(self.config.timing.max_height_settle()).await;
        self.core.position.z = self.config.timing.max_height;
        Ok(self.core.position.z as i32)
    }

    async fn turn_horizontal(&mut self, angle: f64) -> ExecutionResult {
        info!("Going to horizontal angle {}", format_coordinate(angle));
        let settle = self.config.timing.turn_settle();
        self.core.settle_then_set(AxisId::Pan, angle, settle).await
    }

    async fn turn_vertical(&mut self, angle: f64) -> ExecutionResult {
        info!("Going to vertical angle {}", format_coordinate(angle));
        let settle = self.config.timing.turn_settle();
        self.core.settle_then_set(AxisId::Tilt, angle, settle).await
    }
}
