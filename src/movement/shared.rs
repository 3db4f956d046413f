use std::time::Duration;

use tracing::warn;

use crate::{
    axis::{position::Position, AxisId},
    protocol::error::{CommandError, ExecutionResult, SUCCESS},
};

/// State shared by every backend variant: the pose and the fault flag of the
/// operation in progress.
#[derive(Debug, Default)]
pub struct MotionCore {
    pub position: Position,
    movement_error: bool,
}

impl MotionCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_operation(&mut self) {
        self.movement_error = false;
    }

    pub fn movement_error(&self) -> bool {
        self.movement_error
    }

    /// Raises the fault flag if a collaborator call failed.
    pub fn check(&mut self, axis: AxisId, result: anyhow::Result<()>) {
        if let Err(e) = result {
            warn!("Movement fault on axis {}: {}", axis, e);
            self.movement_error = true;
        }
    }

    /// Applies `value` to `axis` unless a fault was raised during the operation.
    pub fn commit(&mut self, axis: AxisId, value: f64) -> ExecutionResult {
        if self.movement_error {
            return Err(CommandError::GenericMovement);
        }
        self.position.set(axis, value);
        Ok(SUCCESS)
    }

    /// Angle change on a device without a driver for it: wait out the turn, then record it.
    pub async fn settle_then_set(
        &mut self,
        axis: AxisId,
        value: f64,
        settle: Duration,
    ) -> ExecutionResult {
        tokio::time::sleep(settle).await;
        self.begin_operation();
        self.commit(axis, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_without_fault() {
        let mut core = MotionCore::new();
        core.begin_operation();
        core.check(AxisId::X, Ok(()));
        assert_eq!(core.commit(AxisId::X, 4.0), Ok(SUCCESS));
        assert_eq!(core.position.x, 4.0);
    }

    #[test]
    fn test_fault_suppresses_update() {
        let mut core = MotionCore::new();
        core.begin_operation();
        core.check(AxisId::Z, Err(anyhow::anyhow!("stalled")));
        assert!(core.movement_error());
        assert_eq!(
            core.commit(AxisId::Z, 4.0),
            Err(CommandError::GenericMovement)
        );
        assert_eq!(core.position.z, 0.0);

        core.begin_operation();
        assert!(!core.movement_error());
    }
}
