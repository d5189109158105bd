use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("invalid option: {0:?}")]
    InvalidOption(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyParseError {
    #[error("body does not report a delay: {0:?}")]
    MissingDelay(String),
    #[error("body does not report a simulated error code: {0:?}")]
    MissingErrorCode(String),
    #[error("reported error code {reported} does not match status {status}")]
    StatusMismatch { status: u16, reported: u16 },
}
