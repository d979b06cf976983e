//! Error types for the ETB client.
//!
//! Failures are split by where they happened so a caller can tell them
//! apart: the remote side or the wire ([`TransportFault`]), a reply that
//! arrived but had the wrong shape ([`DecodeError`]), and the local
//! filesystem ([`EtbError::LocalIo`]).

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = EtbError> = std::result::Result<T, E>;

/// Top-level error returned by every session operation.
#[derive(Debug, Error)]
pub enum EtbError {
    /// The remote call failed or the server answered with a fault.
    #[error(transparent)]
    Transport(#[from] TransportFault),

    /// The reply arrived but could not be decoded into the expected shape.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Reading or writing a local file failed.
    #[error("Local I/O error on {}: {source}", .path.display())]
    LocalIo {
        /// The file or directory involved.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The client configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EtbError {
    pub(crate) fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EtbError::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// The server fault, if this error is one.
    pub fn fault(&self) -> Option<(i32, &str)> {
        match self {
            EtbError::Transport(TransportFault::Fault { code, message }) => {
                Some((*code, message.as_str()))
            }
            _ => None,
        }
    }
}

/// A failed remote call.
#[derive(Debug, Error)]
pub enum TransportFault {
    /// The server returned an XML-RPC fault.
    #[error("ETB fault {code}: {message}")]
    Fault {
        /// XML-RPC fault code
        code: i32,
        /// Fault string exactly as the server sent it
        message: String,
    },

    /// The HTTP request could not be delivered or the server refused it.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// No reply arrived within the request timeout.
    #[error("Request timed out after {:?}", .0)]
    Timeout(Duration),

    /// The HTTP response was not a well-formed XML-RPC reply.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl TransportFault {
    /// The human-readable part of a server fault.
    ///
    /// The ETB server reports exceptions as `<exception type>:<message>`;
    /// this strips the type prefix. Non-fault variants return their
    /// display text.
    pub fn summary(&self) -> String {
        match self {
            TransportFault::Fault { message, .. } => match message.split_once(':') {
                Some((_, rest)) => rest.trim().to_string(),
                None => message.clone(),
            },
            other => other.to_string(),
        }
    }
}

/// A reply that could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The reply text is not a JSON array.
    #[error("Reply is not a JSON array: {0}")]
    NotAnArray(#[source] serde_json::Error),

    /// An answer element is not a JSON string carrying nested JSON.
    #[error("Answer {index} is not a JSON-encoded string: {source}")]
    NotEncoded {
        /// Position of the element in the reply array
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// An answer element does not hold a `__Subst` object of `__Var` pairs.
    #[error("Answer {index} is not a substitution: {source}")]
    Substitution {
        /// Position of the element in the reply array
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The XML-RPC reply value had the wrong type for the method.
    #[error("Unexpected reply to {method}: expected {expected}, got {found}")]
    UnexpectedReply {
        /// Remote method name
        method: &'static str,
        /// What the client expected
        expected: &'static str,
        /// Debug rendering of what arrived
        found: String,
    },

    /// Downloaded file content is not valid base64.
    #[error("Invalid base64 file content: {0}")]
    Base64(#[from] base64::DecodeError),
}
