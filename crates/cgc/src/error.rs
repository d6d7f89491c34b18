//! Error Module - CGC Error Types
//!
//! Defines all error types used by the collector.
//!
//! # Error Categories
//!
//! ## Resource exhaustion (recoverable)
//! - `OutOfMemory` - backing allocation for a managed block failed
//! - `ScratchExhausted` - scratch storage for the heap scan could not grow
//!
//! ## Contract / usage errors
//! - `AlreadyTracked` - adoption of a block address the registry already holds
//! - `Configuration` - invalid collector configuration
//! - `InvalidArgument` - argument failed boundary validation

use thiserror::Error;

/// Main error type for all collector operations
#[derive(Debug, Error)]
pub enum CgcError {
    /// Out of memory - backing allocation failed
    ///
    /// **When returned:** `malloc` could not provide a block of the requested
    /// size, or an internal record could not be created.
    ///
    /// **Recovery strategy:** force a collection and retry, or fail gracefully.
    #[error("out of memory: requested {requested} bytes")]
    OutOfMemory { requested: usize },

    /// A block with this address is already tracked
    ///
    /// **When returned:** `adopt` was handed an address the registry already
    /// holds a record for. Exactly one record may exist per address; the
    /// registry is left unchanged.
    ///
    /// **Recovery strategy:** none - this is a caller bug. The existing record
    /// keeps managing the block.
    #[error("block {address:#x} is already tracked")]
    AlreadyTracked { address: usize },

    /// Scratch storage for the heap scan could not be reserved
    ///
    /// **When returned:** the mark worklist failed to reserve capacity at the
    /// start of the heap scan. The cycle is abandoned before the sweep, so
    /// nothing is reclaimed and no live object is at risk.
    #[error("heap-scan scratch exhausted: needed {needed} bytes")]
    ScratchExhausted { needed: usize },

    /// Configuration error
    ///
    /// **When returned:** `GcConfig::validate` rejected the configuration at
    /// collector creation.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid argument
    ///
    /// **When returned:** a function argument failed boundary validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CgcError {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the collector internally consistent; the
    /// caller may retry the operation or continue without it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CgcError::OutOfMemory { .. } | CgcError::ScratchExhausted { .. }
        )
    }
}

/// Result type alias for collector operations
pub type Result<T> = std::result::Result<T, CgcError>;
