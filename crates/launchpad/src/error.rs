//! Error types for the launchpad adapter.

use thiserror::Error;

use crate::config::ConfigError;
use crate::protocol::Variant;

/// Failures reported by an input or output stream.
///
/// The core never wraps or retries these; they reach the caller exactly as
/// the transport produced them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("failed to open stream: {0}")]
    Open(String),

    #[error("failed to write to stream: {0}")]
    Write(String),

    #[error("failed to read from stream: {0}")]
    Read(String),

    #[error("failed to close stream: {0}")]
    Close(String),

    #[error("stream is closed")]
    Closed,

    #[error("MIDI port error: {0}")]
    Port(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("grid position ({x}, {y}) is outside the 9x9 button grid")]
    InvalidCoordinate { x: u8, y: u8 },

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("{variant:?} launchpad cannot encode a {len}-byte color")]
    UnsupportedColor { variant: Variant, len: usize },

    #[error("scrolling text must be ASCII")]
    NonAsciiText,

    #[error("failed to close launchpad: {}", .0.join("; "))]
    Close(Vec<String>),

    #[error("failed to spawn receive thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("discovery failed: {0}")]
    Discovery(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "midi-io")]
impl From<midir::InitError> for TransportError {
    fn from(e: midir::InitError) -> Self {
        TransportError::Port(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::SendError> for TransportError {
    fn from(e: midir::SendError) -> Self {
        TransportError::Write(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_error_joins_messages() {
        let err = Error::Close(vec!["input gone".to_string(), "output gone".to_string()]);
        assert_eq!(
            err.to_string(),
            "failed to close launchpad: input gone; output gone"
        );
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err: Error = TransportError::Write("cable unplugged".to_string()).into();
        assert_eq!(err.to_string(), "failed to write to stream: cable unplugged");
        assert!(matches!(
            err,
            Error::Transport(TransportError::Write(ref msg)) if msg == "cable unplugged"
        ));
    }
}
