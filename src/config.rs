//! Decoder limits and session configuration.
//!
//! Every length read from the wire is checked against [`Limits`] before
//! anything is allocated for it. Defaults are conservative and can be
//! overridden in code or loaded from JSON.
//!
//! # Example
//!
//! ```
//! use bridgewire::config::BridgeConfig;
//!
//! let config = BridgeConfig::from_json_str(r#"{ "limits": { "max_string_len": 4096 } }"#).unwrap();
//! assert_eq!(config.limits.max_string_len, 4096);
//! assert_eq!(config.limits.max_nesting_depth, 32);
//! ```

use serde::Deserialize;

use crate::error::Result;

/// Default maximum string payload (16 MiB).
pub const DEFAULT_MAX_STRING_LEN: u32 = 16 * 1024 * 1024;

/// Default maximum number of values in one sequence.
pub const DEFAULT_MAX_SEQUENCE_LEN: u32 = 1 << 20;

/// Default maximum sequence nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Default cap on bytes buffered for one incomplete message (64 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Default socket read chunk (64 KB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Default number of received values a handler holds before they are drained.
pub const DEFAULT_MAX_STORED_VALUES: usize = 64 * 1024;

/// Bounds applied while decoding untrusted bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Longest accepted string, in bytes.
    pub max_string_len: u32,
    /// Most elements accepted in one sequence.
    pub max_sequence_len: u32,
    /// Deepest accepted sequence nesting.
    pub max_nesting_depth: usize,
    /// Most bytes held for a single message that is still incomplete.
    pub max_message_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// Configuration for a [`Session`](crate::session::Session).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Decoder limits.
    pub limits: Limits,
    /// Size of each read from the stream.
    pub read_buffer_size: usize,
    /// Values a [`BridgeHandler`](crate::handler::BridgeHandler) keeps
    /// undrained before rejecting more.
    pub max_stored_values: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_stored_values: DEFAULT_MAX_STORED_VALUES,
        }
    }
}

impl BridgeConfig {
    /// Create a configuration with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the maximum string length.
    pub fn max_string_len(mut self, len: u32) -> Self {
        self.limits.max_string_len = len;
        self
    }

    /// Set the maximum sequence length.
    pub fn max_sequence_len(mut self, len: u32) -> Self {
        self.limits.max_sequence_len = len;
        self
    }

    /// Set the maximum nesting depth.
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.limits.max_nesting_depth = depth;
        self
    }

    /// Set the maximum buffered size of one incomplete message.
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.limits.max_message_size = size;
        self
    }

    /// Set the read chunk size.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set how many undrained values a handler may hold.
    pub fn max_stored_values(mut self, count: usize) -> Self {
        self.max_stored_values = count;
        self
    }
}
