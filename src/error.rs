//! Error types for bridgewire.

use thiserror::Error;

use crate::protocol::TypeCode;

/// Main error type for all bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// I/O error on the underlying channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Stream did not start with the protocol magic.
    #[error("Protocol mismatch: expected magic {expected:#06x}, found {found:#06x}")]
    ProtocolMismatch {
        /// Magic the endpoint speaks.
        expected: u16,
        /// Bytes found on the wire.
        found: u16,
    },

    /// No message kind is registered for this type code.
    #[error("Unknown message type: {0}")]
    UnknownMessageType(TypeCode),

    /// Body is oversized or structurally invalid.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// Body ended before the declared shape was complete.
    ///
    /// A malformed-message case: it reports as `MalformedMessage` on the
    /// wire (see [`error_code`](Self::error_code)). Match both variants, or
    /// use [`is_malformed`](Self::is_malformed), to catch every bad body.
    #[error("Malformed message: truncated, needed {needed} bytes but {available} available")]
    Truncated {
        /// Bytes the next read required.
        needed: usize,
        /// Bytes that were left.
        available: usize,
    },

    /// Value tag outside the closed set.
    #[error("Unsupported value kind: {0}")]
    UnsupportedValueKind(String),

    /// The runtime could not construct the requested object.
    #[error("Construction of {class_name} failed: {reason}")]
    ConstructionFailure {
        /// Requested class.
        class_name: String,
        /// Failure reported by the resolver.
        reason: String,
    },

    /// Invalid registry setup (duplicate or reserved type code).
    #[error("Registry error: {0}")]
    Registry(String),
}

impl BridgeError {
    /// Shorthand for [`BridgeError::MalformedMessage`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedMessage(msg.into())
    }

    /// Framing errors leave the stream position unknown; the channel must be closed.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            Self::ProtocolMismatch { .. } | Self::UnknownMessageType(_)
        )
    }

    /// Truncated and malformed bodies.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedMessage(_) | Self::Truncated { .. })
    }

    /// Wire code used when this error is reported back in an error reply.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ProtocolMismatch { .. } => ErrorCode::ProtocolMismatch,
            Self::UnknownMessageType(_) => ErrorCode::UnknownMessageType,
            Self::MalformedMessage(_) | Self::Truncated { .. } => ErrorCode::MalformedMessage,
            Self::UnsupportedValueKind(_) => ErrorCode::UnsupportedValueKind,
            Self::ConstructionFailure { .. } => ErrorCode::ConstructionFailure,
            Self::Io(_) | Self::Config(_) | Self::Registry(_) => ErrorCode::Internal,
        }
    }
}

/// Error categories as carried on the wire by error replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    /// Anything not covered below.
    Internal = 0,
    /// Bad or absent magic.
    ProtocolMismatch = 1,
    /// Unregistered type code.
    UnknownMessageType = 2,
    /// Truncated, oversized or invalid body.
    MalformedMessage = 3,
    /// Value tag outside the closed set.
    UnsupportedValueKind = 4,
    /// Resolver failure.
    ConstructionFailure = 5,
}

impl ErrorCode {
    /// Decode a wire byte; unknown codes map to [`ErrorCode::Internal`].
    pub fn from_u8(code: u8) -> Self {
        match code {
            1 => Self::ProtocolMismatch,
            2 => Self::UnknownMessageType,
            3 => Self::MalformedMessage,
            4 => Self::UnsupportedValueKind,
            5 => Self::ConstructionFailure,
            _ => Self::Internal,
        }
    }
}

/// Result type alias using BridgeError.
pub type Result<T> = std::result::Result<T, BridgeError>;
