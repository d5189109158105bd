use serde::{Deserialize, Serialize};

use crate::{domain::SIMULATED_ERROR_CODES, error::ReplyParseError};

pub const SERVICE1_ROUTE: &str = "/service1";
pub const SERVICE2_ROUTE: &str = "/service2";

pub const CONTROL_GROUP_BODY: &str = "Hello from Service 2!";
pub const NOT_FOUND_BODY: &str = "Not Found";

const DELAY_PREFIX: &str = "Response after ";
const DELAY_SUFFIX: &str = "ms";
const ERROR_PREFIX: &str = "Simulated error: ";

/// Transport-independent reply produced by a service handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceReply {
    pub status: u16,
    pub body: String,
}

impl ServiceReply {
    pub fn delayed(delay_ms: u64) -> Self {
        Self {
            status: 200,
            body: format!("{DELAY_PREFIX}{delay_ms}{DELAY_SUFFIX}"),
        }
    }

    pub fn simulated_error(code: u16) -> Self {
        Self {
            status: code,
            body: format!("{ERROR_PREFIX}{code}"),
        }
    }

    pub fn control_group() -> Self {
        Self {
            status: 200,
            body: CONTROL_GROUP_BODY.to_string(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: NOT_FOUND_BODY.to_string(),
        }
    }
}

/// What a client observed from one request against the fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyKind {
    Delayed { reported_ms: u64 },
    SimulatedError { code: u16 },
    ControlGroup,
    Other { status: u16 },
}

pub fn parse_delay_report(body: &str) -> Result<u64, ReplyParseError> {
    body.strip_prefix(DELAY_PREFIX)
        .and_then(|rest| rest.strip_suffix(DELAY_SUFFIX))
        .and_then(|digits| digits.parse::<u64>().ok())
        .ok_or_else(|| ReplyParseError::MissingDelay(body.to_string()))
}

pub fn parse_simulated_error(status: u16, body: &str) -> Result<u16, ReplyParseError> {
    let reported = body
        .strip_prefix(ERROR_PREFIX)
        .and_then(|digits| digits.parse::<u16>().ok())
        .ok_or_else(|| ReplyParseError::MissingErrorCode(body.to_string()))?;
    if reported != status {
        return Err(ReplyParseError::StatusMismatch { status, reported });
    }
    Ok(reported)
}

pub fn classify_reply(status: u16, body: &str) -> ReplyKind {
    if status == 200 {
        if body == CONTROL_GROUP_BODY {
            return ReplyKind::ControlGroup;
        }
        if let Ok(reported_ms) = parse_delay_report(body) {
            return ReplyKind::Delayed { reported_ms };
        }
    } else if SIMULATED_ERROR_CODES.contains(&status) {
        if let Ok(code) = parse_simulated_error(status, body) {
            return ReplyKind::SimulatedError { code };
        }
    }
    ReplyKind::Other { status }
}
