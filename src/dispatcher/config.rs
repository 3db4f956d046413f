use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// How long a pump command keeps the line busy.
    pub pump_run_ms: u64,
}

impl DispatcherConfig {
    pub fn pump_run(&self) -> Duration {
        Duration::from_millis(self.pump_run_ms)
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { pump_run_ms: 500 }
    }
}
