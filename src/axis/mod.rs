pub mod driver;
pub mod position;
pub mod servo;

#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};

/// One independently controlled degree of motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisId {
    X,
    Y,
    Z,
    Pan,
    Tilt,
}

impl AxisId {
    pub fn name(&self) -> &'static str {
        match self {
            AxisId::X => "x",
            AxisId::Y => "y",
            AxisId::Z => "z",
            AxisId::Pan => "pan",
            AxisId::Tilt => "tilt",
        }
    }
}

impl std::fmt::Display for AxisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
