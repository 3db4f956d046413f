//! Recording fakes for the hardware collaborators.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use anyhow::Result;

use super::{driver::StepperDriver, servo::ServoDriver};

#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Enable,
    Disable,
    Move(i64),
    Stop,
}

/// Shared view of what a [`RecordingStepper`] was asked to do.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<DriverCall>>>,
    fail_moves: Arc<AtomicBool>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_moves(&self, fail: bool) {
        self.fail_moves.store(fail, Ordering::Relaxed);
    }

    fn push(&self, call: DriverCall) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct RecordingStepper {
    name: String,
    log: CallLog,
}

impl RecordingStepper {
    pub fn new(name: &str) -> (Self, CallLog) {
        let log = CallLog::default();
        (
            Self {
                name: name.to_string(),
                log: log.clone(),
            },
            log,
        )
    }
}

#[async_trait::async_trait]
impl StepperDriver for RecordingStepper {
    fn name(&self) -> &str {
        &self.name
    }

    async fn enable(&self) -> Result<()> {
        self.log.push(DriverCall::Enable);
        Ok(())
    }

    async fn disable(&self) -> Result<()> {
        self.log.push(DriverCall::Disable);
        Ok(())
    }

    async fn move_steps(&self, steps: i64) -> Result<()> {
        self.log.push(DriverCall::Move(steps));
        if self.log.fail_moves.load(Ordering::Relaxed) {
            anyhow::bail!("{}: driver fault", self.name);
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.log.push(DriverCall::Stop);
        anyhow::bail!("{}: stop is best effort", self.name)
    }
}

pub struct RecordingServo {
    name: String,
    angles: Arc<Mutex<Vec<f64>>>,
}

impl RecordingServo {
    pub fn new(name: &str) -> (Self, Arc<Mutex<Vec<f64>>>) {
        let angles = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                name: name.to_string(),
                angles: angles.clone(),
            },
            angles,
        )
    }
}

#[async_trait::async_trait]
impl ServoDriver for RecordingServo {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_angle(&self, degrees: f64) -> Result<()> {
        self.angles.lock().unwrap().push(degrees);
        Ok(())
    }
}
