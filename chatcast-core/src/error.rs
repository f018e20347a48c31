use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Relay-level errors surfaced to the control surface.
///
/// Asynchronous upstream failures (after the connect handshake) never appear
/// here; they are pushed to subscribers as an `error` broadcast instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("Failed to start upstream connection: {0}")]
    UpstreamConnect(String),

    #[error("Failed to disconnect upstream session: {0}")]
    UpstreamDisconnect(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_cause() {
        let err = Error::UpstreamConnect("handshake refused".to_string());
        assert!(err.to_string().contains("handshake refused"));

        let err = Error::UpstreamDisconnect("socket already closed".to_string());
        assert!(err.to_string().contains("socket already closed"));
    }
}
