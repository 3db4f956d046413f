pub mod config;
pub mod direct_step;
pub mod driver_enabled;
pub mod hardware;
pub mod progress;
pub mod shared;
pub mod simulated;

use anyhow::Result;

use crate::{axis::position::Position, protocol::error::ExecutionResult};
use config::BackendConfig;
use direct_step::DirectStepBackend;
use driver_enabled::DriverEnabledBackend;
use hardware::HardwareAxes;
use progress::ProgressReporter;
use simulated::SimulatedBackend;

/// Uniform motion contract implemented by every backend variant.
///
/// Each call runs to completion (or to its first fault) before returning.
/// `progress` is only borrowed for the duration of the call.
#[async_trait::async_trait]
pub trait MovementBackend: Send + Sync {
    fn name(&self) -> &str;

    fn position(&self) -> Position;

    /// Never fails.
    async fn stop_all(&mut self);

    /// Moves x, then y. A failure on x means y is not attempted.
    async fn move_to_xy(
        &mut self,
        x: f64,
        y: f64,
        progress: &mut dyn ProgressReporter,
    ) -> ExecutionResult;

    async fn move_to_height(&mut self, z: f64, progress: &mut dyn ProgressReporter)
        -> ExecutionResult;

    /// Returns the reached height as an integer measurement.
    async fn move_to_max_height(&mut self) -> ExecutionResult;

    async fn turn_horizontal(&mut self, angle: f64) -> ExecutionResult;

    async fn turn_vertical(&mut self, angle: f64) -> ExecutionResult;
}

/// Builds the configured backend. Hardware variants get dry-run drivers;
/// use the variant constructors directly to inject real ones.
pub fn build_backend(config: &BackendConfig) -> Result<Box<dyn MovementBackend>> {
    config.validate()?;
    let backend: Box<dyn MovementBackend> = match config {
        BackendConfig::Simulated(sim) => Box::new(SimulatedBackend::new(sim.clone())),
        BackendConfig::DirectStep(hw) => {
            Box::new(DirectStepBackend::new(hw.clone(), HardwareAxes::dry_run(hw)))
        }
        BackendConfig::DriverEnabled(hw) => {
            Box::new(DriverEnabledBackend::new(hw.clone(), HardwareAxes::dry_run(hw)))
        }
    };
    Ok(backend)
}
