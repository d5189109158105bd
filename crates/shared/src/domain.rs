use serde::{Deserialize, Serialize};

pub const DEFAULT_DELAY_MS: u64 = 2000;
pub const DELAY_STEP_MS: u64 = 500;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8082";

/// Status codes `/service1` picks from while error mode is on. Order is fixed.
pub const SIMULATED_ERROR_CODES: [u16; 5] = [400, 401, 403, 404, 500];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSnapshot {
    pub delay_ms: u64,
    pub error_mode: bool,
}

impl ControlSnapshot {
    pub fn error_mode_label(&self) -> &'static str {
        if self.error_mode {
            "ON"
        } else {
            "OFF"
        }
    }
}

impl Default for ControlSnapshot {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            error_mode: false,
        }
    }
}
