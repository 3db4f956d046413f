use serde::{Deserialize, Serialize};

use super::AxisId;
use crate::protocol::PARAM_SEPARATOR;

/// Current commanded pose of the device. Starts at the origin and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pan: f64,
    pub tilt: f64,
}

impl Position {
    pub fn origin() -> Self {
        Self::default()
    }

    pub fn get(&self, axis: AxisId) -> f64 {
        match axis {
            AxisId::X => self.x,
            AxisId::Y => self.y,
            AxisId::Z => self.z,
            AxisId::Pan => self.pan,
            AxisId::Tilt => self.tilt,
        }
    }

    pub fn set(&mut self, axis: AxisId, value: f64) {
        match axis {
            AxisId::X => self.x = value,
            AxisId::Y => self.y = value,
            AxisId::Z => self.z = value,
            AxisId::Pan => self.pan = value,
            AxisId::Tilt => self.tilt = value,
        }
    }

    /// Snapshot of the gantry plane, e.g. `"5.00,0.00"`.
    pub fn planar_snapshot(&self) -> String {
        format!(
            "{}{}{}",
            format_coordinate(self.x),
            PARAM_SEPARATOR,
            format_coordinate(self.y)
        )
    }

    /// Snapshot of the height axis alone, e.g. `"12.00"`.
    pub fn height_snapshot(&self) -> String {
        format_coordinate(self.z)
    }
}

pub fn format_coordinate(value: f64) -> String {
    format!("{:.2}", value)
}
