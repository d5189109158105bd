use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use shared::domain::{ControlSnapshot, DEFAULT_DELAY_MS};

/// Runtime knobs shared between the operator console and request handlers.
///
/// Each field is its own atomic. Nothing needs the two fields to agree with
/// each other, so there is no lock spanning both.
#[derive(Debug)]
pub struct ControlState {
    delay_ms: AtomicU64,
    error_mode: AtomicBool,
}

impl ControlState {
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_DELAY_MS)
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms: AtomicU64::new(delay_ms),
            error_mode: AtomicBool::new(false),
        }
    }

    pub fn delay(&self) -> u64 {
        self.delay_ms.load(Ordering::Relaxed)
    }

    /// Returns the delay after the increase.
    pub fn increase_delay(&self, step: u64) -> u64 {
        self.update_delay(|current| current.saturating_add(step))
    }

    /// Clamps at zero. Returns the delay after the decrease.
    pub fn decrease_delay(&self, step: u64) -> u64 {
        self.update_delay(|current| current.saturating_sub(step))
    }

    pub fn is_error_mode(&self) -> bool {
        self.error_mode.load(Ordering::Relaxed)
    }

    /// Returns the new value of the flag.
    pub fn toggle_error_mode(&self) -> bool {
        !self.error_mode.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            delay_ms: self.delay(),
            error_mode: self.is_error_mode(),
        }
    }

    fn update_delay(&self, f: impl Fn(u64) -> u64) -> u64 {
        let previous = match self
            .delay_ms
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| Some(f(current)))
        {
            Ok(previous) | Err(previous) => previous,
        };
        f(previous)
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
