//! Error types for the IRC client engine.
//!
//! This module defines errors raised by the line codec, by the session
//! lifecycle (connect, registration) and by individual line handlers.
//! Malformed input from the server is never an error at this level: the
//! decoder simply discards it.

use thiserror::Error;

use crate::config::ConfigKey;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors surfaced to users of [`Client`](crate::Client).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// I/O error while connecting, reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The line codec rejected input or output.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A required configuration value is missing.
    #[error("missing configuration value: {0}")]
    Config(ConfigKey),

    /// The server answered the registration with an error numeric.
    #[error("could not log into the IRC server: {line}")]
    Registration {
        /// The raw line that ended the attempt.
        line: String,
    },

    /// The server did not finish registration in time.
    #[error("registration timed out")]
    RegistrationTimeout,

    /// The server closed the connection before registration completed.
    #[error("connection closed during registration")]
    ConnectionClosed,

    /// There is no live connection to send on.
    #[error("not connected")]
    NotConnected,

    /// A message target was not usable on the wire.
    #[error("invalid target: {0:?}")]
    InvalidTarget(String),
}

/// Errors raised by the line codec.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Line exceeded the configured maximum length.
    #[error("message too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Observed length in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Illegal control character in an outgoing line.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),
}

/// Errors returned by individual command and numeric handlers.
///
/// These never leave the line processor; they are logged and the line is
/// dropped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DispatchError {
    /// A handler needed a parameter the line did not carry.
    #[error("{command}: missing parameter {index}")]
    MissingParameter {
        /// Command word or numeric the handler was registered for.
        command: String,
        /// Zero-based parameter index.
        index: usize,
    },
}
