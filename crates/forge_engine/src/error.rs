use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {status}")]
    HttpStatus {
        status: u16,
        /// Text the backend put in the error body, if any.
        message: Option<String>,
    },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Message suitable for showing to the user, when the backend supplied one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ClientError::HttpStatus { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ClientError::Timeout;
        }
        if err.is_decode() {
            return ClientError::Decode(err.to_string());
        }
        ClientError::Network(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("failed to connect: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("channel closed before a terminal frame")]
    ClosedEarly,
    #[error("no progress received for {0:?}")]
    Stalled(Duration),
}
