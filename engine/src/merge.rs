//! Merge strategies - turning two conflicting versions into one payload.
//!
//! Strategies are pure: they read the conflict's stored versions and a
//! caller-supplied timestamp and return resolved bytes. Persistence and
//! bookkeeping live in [`crate::resolver`].

use crate::codec;
use crate::conflict::Conflict;
use crate::error::{Error, Result};
use crate::fields::ItemField;
use crate::record::{EntityKind, Item};
use crate::{Payload, Timestamp};
use serde::{Deserialize, Serialize};

/// Which side a field-level resolution picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldPick {
    /// Keep the local side's value
    UseLocal,
    /// Take the remote side's value
    UseRemote,
}

/// A per-field decision inside a field-level merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldResolution {
    /// Wire name of the field, as reported in [`crate::FieldChange`]
    pub field_name: String,
    pub pick: FieldPick,
}

impl FieldResolution {
    /// Convenience constructor.
    pub fn new(field_name: impl Into<String>, pick: FieldPick) -> Self {
        Self {
            field_name: field_name.into(),
            pick,
        }
    }
}

/// Algorithm for combining two versions into one resolved payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "camelCase")]
pub enum MergeStrategy {
    /// The version with the greater `modified_at` wins outright.
    /// Ties favor the local version.
    #[default]
    LatestWins,
    /// The local payload wins, timestamps ignored
    LocalPriority,
    /// The remote payload wins, timestamps ignored
    RemotePriority,
    /// Per-field picks, items only
    FieldLevel { resolutions: Vec<FieldResolution> },
}

impl MergeStrategy {
    /// Human-readable name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            MergeStrategy::LatestWins => "Latest Changes Win",
            MergeStrategy::LocalPriority => "Local Priority",
            MergeStrategy::RemotePriority => "Remote Priority",
            MergeStrategy::FieldLevel { .. } => "Field-by-Field",
        }
    }
}

/// Resolve a conflict into a single payload using `strategy`.
///
/// `now` stamps the merged record's `modified_at` for field-level merges;
/// the other strategies pass a stored payload through untouched.
pub fn resolve_payload(
    conflict: &Conflict,
    strategy: &MergeStrategy,
    now: Timestamp,
) -> Result<Payload> {
    match strategy {
        MergeStrategy::LatestWins => {
            // Detection guarantees unequal timestamps, so the tie arm is
            // unreachable through the normal flow; local wins regardless.
            if conflict.local_version.modified_at >= conflict.remote_version.modified_at {
                Ok(conflict.local_version.payload.clone())
            } else {
                Ok(conflict.remote_version.payload.clone())
            }
        }
        MergeStrategy::LocalPriority => Ok(conflict.local_version.payload.clone()),
        MergeStrategy::RemotePriority => Ok(conflict.remote_version.payload.clone()),
        MergeStrategy::FieldLevel { resolutions } => merge_fields(conflict, resolutions, now),
    }
}

/// Apply per-field picks on top of the local version.
///
/// Only items have a field table; any other kind is unsupported. Picks
/// naming unknown fields are skipped. The merged record's `modified_at` is
/// strictly greater than both input timestamps.
fn merge_fields(
    conflict: &Conflict,
    resolutions: &[FieldResolution],
    now: Timestamp,
) -> Result<Payload> {
    if conflict.entity_kind != EntityKind::Item {
        return Err(Error::MergeNotSupported(conflict.entity_kind));
    }

    let local: Item = codec::decode(EntityKind::Item, &conflict.local_version.payload)?;
    let remote: Item = codec::decode(EntityKind::Item, &conflict.remote_version.payload)?;

    let mut merged = local.clone();
    for resolution in resolutions {
        if resolution.pick != FieldPick::UseRemote {
            continue;
        }
        match ItemField::from_field_name(&resolution.field_name) {
            Some(field) => field.copy_from(&mut merged, &remote),
            None => {
                tracing::debug!(field = %resolution.field_name, "skipping unknown field in merge");
            }
        }
    }
    merged.modified_at = now
        .max(local.modified_at + 1)
        .max(remote.modified_at + 1);

    codec::encode(EntityKind::Item, &merged)
}
