use std::{sync::Arc, time::Duration};

use control::ControlState;
use rand::Rng;
use shared::{domain::SIMULATED_ERROR_CODES, protocol::ServiceReply};
use tracing::debug;

#[derive(Clone)]
pub struct ApiContext {
    pub control: Arc<ControlState>,
}

impl ApiContext {
    pub fn new(control: Arc<ControlState>) -> Self {
        Self { control }
    }
}

/// `/service1`: random error when error mode is on, otherwise a reply held
/// back for the configured delay.
///
/// The reported delay is the value read before waiting, so an operator change
/// during the wait does not alter the body.
pub async fn primary_service(ctx: &ApiContext) -> ServiceReply {
    if ctx.control.is_error_mode() {
        let code = pick_simulated_error(&mut rand::rng());
        debug!(code, "injecting simulated error");
        return ServiceReply::simulated_error(code);
    }

    let delay_ms = ctx.control.delay();
    if delay_ms > 0 {
        debug!(delay_ms, "injecting delay");
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
    ServiceReply::delayed(delay_ms)
}

/// `/service2`: fixed control-group reply.
pub async fn secondary_service() -> ServiceReply {
    ServiceReply::control_group()
}

pub fn pick_simulated_error<R: Rng>(rng: &mut R) -> u16 {
    SIMULATED_ERROR_CODES[rng.random_range(0..SIMULATED_ERROR_CODES.len())]
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
