/*!
# Unified Error Type

This module provides a unified error enum that consolidates all Fragmenta error types
for better ergonomics and error handling consistency.

The taxonomy mirrors how errors can actually arise in a run: a malformed topology is
rejected before any node starts, a protocol violation means the state machine itself
is broken (a bug, surfaced loudly with the offending node), and a transport error
means a channel was torn down while the algorithm still needed it.
*/

use std::error::Error;
use std::fmt;

/// Unified error type for all Fragmenta operations.
#[derive(Debug, Clone)]
pub enum FragmentaError {
    /// General-purpose error
    Generic(String),

    /// Topology is empty or structurally unusable for the operation
    InvalidTopology(String),

    /// Topology is not connected
    Disconnected(String),

    /// Invalid argument or parameter
    InvalidArgument(String),

    /// A GHS protocol invariant was violated at a node. Always a bug, never recoverable.
    Protocol { node: usize, message: String },

    /// A delivery channel closed while the algorithm was still running
    Transport(String),

    /// Algorithm terminated in an inconsistent state
    AlgorithmError(String),

    /// I/O error
    IoError(String),

    /// Serialization/deserialization error
    SerializationError(String),
}

impl FragmentaError {
    /// Creates a generic error with the given message.
    pub fn generic(message: impl Into<String>) -> Self {
        FragmentaError::Generic(message.into())
    }

    /// Creates an invalid topology error.
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        FragmentaError::InvalidTopology(message.into())
    }

    /// Creates a disconnected topology error.
    pub fn disconnected(message: impl Into<String>) -> Self {
        FragmentaError::Disconnected(message.into())
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        FragmentaError::InvalidArgument(message.into())
    }

    /// Creates a protocol violation error for the given node.
    pub fn protocol(node: usize, message: impl Into<String>) -> Self {
        FragmentaError::Protocol {
            node,
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        FragmentaError::Transport(message.into())
    }

    /// Creates an algorithm error.
    pub fn algorithm_error(message: impl Into<String>) -> Self {
        FragmentaError::AlgorithmError(message.into())
    }
}

impl fmt::Display for FragmentaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FragmentaError::Generic(msg) => write!(f, "Fragmenta error: {}", msg),
            FragmentaError::InvalidTopology(msg) => write!(f, "Invalid topology: {}", msg),
            FragmentaError::Disconnected(msg) => write!(f, "Disconnected topology: {}", msg),
            FragmentaError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            FragmentaError::Protocol { node, message } => {
                write!(f, "Protocol violation at node {}: {}", node, message)
            }
            FragmentaError::Transport(msg) => write!(f, "Transport error: {}", msg),
            FragmentaError::AlgorithmError(msg) => write!(f, "Algorithm error: {}", msg),
            FragmentaError::IoError(msg) => write!(f, "I/O error: {}", msg),
            FragmentaError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl Error for FragmentaError {}

impl From<std::io::Error> for FragmentaError {
    fn from(e: std::io::Error) -> Self {
        FragmentaError::IoError(e.to_string())
    }
}

impl From<serde_json::Error> for FragmentaError {
    fn from(e: serde_json::Error) -> Self {
        FragmentaError::SerializationError(e.to_string())
    }
}

impl<T> From<crossbeam_channel::SendError<T>> for FragmentaError {
    fn from(_: crossbeam_channel::SendError<T>) -> Self {
        FragmentaError::Transport("channel receiver dropped before shutdown".to_string())
    }
}

impl From<crossbeam_channel::RecvError> for FragmentaError {
    fn from(_: crossbeam_channel::RecvError) -> Self {
        FragmentaError::Transport("channel sender dropped before shutdown".to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FragmentaError>;
