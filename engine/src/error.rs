//! Error types for the Tally engine.

use crate::record::EntityKind;
use thiserror::Error;

/// All possible errors from the Tally engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unsupported entity kind: {0}")]
    UnsupportedEntityKind(String),

    #[error("failed to decode {kind} snapshot: {reason}")]
    DecodingFailed { kind: EntityKind, reason: String },

    #[error("failed to encode {kind} snapshot: {reason}")]
    EncodingFailed { kind: EntityKind, reason: String },

    #[error("merge not supported for {0}")]
    MergeNotSupported(EntityKind),

    #[error("failed to apply resolution: {0}")]
    ResolutionFailed(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
