// src/io/error.rs
//
// Failure taxonomy for the link layer.
//
// None of these cross the LinkSession boundary as errors: the session turns
// them into a single notification via `user_message`, except `PostClose`,
// which is only logged.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Bad or unsupported line parameters, including unparsable custom baud text
    #[error("invalid line configuration: {0}")]
    Configuration(String),

    /// Device missing, busy or access denied
    #[error("failed to open {port}: {detail}")]
    Open { port: String, detail: String },

    /// I/O error while writing to an open handle
    #[error("write error: {0}")]
    Write(String),

    /// I/O error while pulling received bytes
    #[error("read error: {0}")]
    Read(String),

    /// The OS device list could not be queried
    #[error("failed to enumerate ports: {0}")]
    Enumerate(String),

    /// I/O error from a handle that was already closed
    #[error("I/O after close: {0}")]
    PostClose(String),
}

impl LinkError {
    pub fn configuration(detail: impl Into<String>) -> Self {
        LinkError::Configuration(detail.into())
    }

    pub fn open(port: impl Into<String>, detail: impl Into<String>) -> Self {
        LinkError::Open {
            port: port.into(),
            detail: detail.into(),
        }
    }

    /// Errors that are expected noise and never shown to the user
    pub fn is_suppressed(&self) -> bool {
        matches!(self, LinkError::PostClose(_))
    }

    /// Two-line status text for the notification surface.
    pub fn user_message(&self) -> String {
        match self {
            LinkError::Configuration(detail) => format!("Failed to open port\n{}", detail),
            LinkError::Open { port, detail } => format!("Failed to open port\n{}: {}", port, detail),
            LinkError::Write(detail) => format!("Send failed\n{}", detail),
            LinkError::Read(detail) => format!("Connection lost\n{}", detail),
            LinkError::Enumerate(detail) => format!("Port scan failed\n{}", detail),
            LinkError::PostClose(detail) => detail.clone(),
        }
    }
}
