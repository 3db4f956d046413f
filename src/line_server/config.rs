use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineServerConfig {
    pub socket_path: String,
    pub max_connections: usize,
    /// Longest accepted request line, in bytes.
    pub max_line_length: usize,
}

impl Default for LineServerConfig {
    fn default() -> Self {
        Self {
            socket_path: "/tmp/gantryd.sock".to_string(),
            max_connections: 4,
            max_line_length: 256,
        }
    }
}
