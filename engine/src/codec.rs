//! Snapshot codec boundary.
//!
//! Conflicts carry both sides of a record as opaque byte payloads. This
//! module is the single place that turns a typed record into payload bytes
//! and back; the rest of the engine passes payloads through unmodified
//! unless a merge or a detail view forces a round trip.

use crate::error::{Error, Result};
use crate::record::EntityKind;
use crate::Payload;
use serde::{de::DeserializeOwned, Serialize};

/// Encode a typed record into an opaque snapshot payload.
pub fn encode<T: Serialize>(kind: EntityKind, record: &T) -> Result<Payload> {
    serde_json::to_vec(record).map_err(|e| Error::EncodingFailed {
        kind,
        reason: e.to_string(),
    })
}

/// Decode a snapshot payload back into its typed record.
pub fn decode<T: DeserializeOwned>(kind: EntityKind, payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload).map_err(|e| Error::DecodingFailed {
        kind,
        reason: e.to_string(),
    })
}
