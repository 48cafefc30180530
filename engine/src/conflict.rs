//! Conflict model and detection.
//!
//! Detection compares the local and remote copies of every record present on
//! both sides and emits one [`Conflict`] per divergent pair.
//!
//! # Algorithm
//!
//! 1. Build an id-keyed lookup per record kind
//! 2. For every id present on both sides, compare `modified_at`
//! 3. On inequality, snapshot both sides and (items only) diff their fields
//! 4. Records present on one side only are skipped; create/delete
//!    reconciliation belongs to the sync layer, not the engine

use crate::codec;
use crate::error::Result;
use crate::fields::diff_items;
use crate::record::{EntityKind, Item, Location, Receipt, RecordSet};
use crate::{ConflictId, DeviceLabel, EntityId, Payload, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// What kind of disagreement a conflict represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    /// Both sides modified the same record
    #[default]
    Update,
}

impl ConflictType {
    /// Human-readable name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            ConflictType::Update => "Update Conflict",
        }
    }

    /// Longer explanation for the review UI.
    pub fn description(&self) -> &'static str {
        match self {
            ConflictType::Update => "This record was modified in multiple places",
        }
    }
}

/// A field-level difference between two versions of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    /// Wire name of the field
    pub field_name: String,
    /// Human-readable name for display
    pub display_name: String,
    /// Value on the owning side, `None` when unset
    pub old_value: Option<String>,
    /// Value on the other side, `None` when unset
    pub new_value: Option<String>,
    /// Whether both sides contest this field
    pub is_conflicting: bool,
}

/// One side of a conflict: an encoded snapshot plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictVersion {
    /// Opaque encoded snapshot of the record on this side
    pub payload: Payload,
    /// When this side last modified the record
    pub modified_at: Timestamp,
    /// Label of the originating device, present on the local side only
    pub device_label: Option<DeviceLabel>,
    /// Field-level differences against the other side (items only)
    pub changes: Vec<FieldChange>,
}

/// A detected disagreement between the local and remote copies of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Unique id for this conflict, minted at detection time
    pub id: ConflictId,
    pub entity_kind: EntityKind,
    pub entity_id: EntityId,
    pub local_version: ConflictVersion,
    pub remote_version: ConflictVersion,
    pub conflict_type: ConflictType,
    /// When detection found this conflict (milliseconds since epoch)
    pub detected_at: Timestamp,
}

/// Detection-facing view of a record: identity, recency, diffability.
pub(crate) trait SyncRecord: Serialize {
    const KIND: EntityKind;

    fn entity_id(&self) -> EntityId;
    fn modified_at(&self) -> Timestamp;

    /// Field diffs against the other side. Empty unless the kind has a
    /// field table.
    fn changes_against(&self, _other: &Self) -> Vec<FieldChange> {
        Vec::new()
    }
}

impl SyncRecord for Item {
    const KIND: EntityKind = EntityKind::Item;

    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn modified_at(&self) -> Timestamp {
        self.modified_at
    }

    fn changes_against(&self, other: &Self) -> Vec<FieldChange> {
        diff_items(self, other)
    }
}

impl SyncRecord for Receipt {
    const KIND: EntityKind = EntityKind::Receipt;

    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn modified_at(&self) -> Timestamp {
        self.modified_at
    }
}

impl SyncRecord for Location {
    const KIND: EntityKind = EntityKind::Location;

    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn modified_at(&self) -> Timestamp {
        self.modified_at
    }
}

/// Detects conflicts between local and remote record sets.
pub struct ConflictDetector {
    device_label: DeviceLabel,
}

impl ConflictDetector {
    /// Create a detector that stamps local versions with `device_label`.
    pub fn new(device_label: impl Into<DeviceLabel>) -> Self {
        Self {
            device_label: device_label.into(),
        }
    }

    /// Compare both sets and return one conflict per divergent pair.
    ///
    /// `now` stamps `detected_at` on every conflict. Equal modification
    /// timestamps never produce a conflict.
    pub fn detect(&self, local: &RecordSet, remote: &RecordSet, now: Timestamp) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        self.detect_kind(&local.items, &remote.items, now, &mut conflicts);
        self.detect_kind(&local.receipts, &remote.receipts, now, &mut conflicts);
        self.detect_kind(&local.locations, &remote.locations, now, &mut conflicts);
        conflicts
    }

    fn detect_kind<R: SyncRecord>(
        &self,
        local: &[R],
        remote: &[R],
        now: Timestamp,
        out: &mut Vec<Conflict>,
    ) {
        let remote_by_id: HashMap<EntityId, &R> =
            remote.iter().map(|r| (r.entity_id(), r)).collect();

        for local_rec in local {
            let remote_rec = match remote_by_id.get(&local_rec.entity_id()) {
                Some(r) => *r,
                None => continue,
            };
            if local_rec.modified_at() == remote_rec.modified_at() {
                continue;
            }
            if let Some(conflict) = self.build_conflict(local_rec, remote_rec, now) {
                out.push(conflict);
            }
        }
    }

    fn build_conflict<R: SyncRecord>(
        &self,
        local: &R,
        remote: &R,
        now: Timestamp,
    ) -> Option<Conflict> {
        let local_payload = match codec::encode(R::KIND, local) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(kind = %R::KIND, "snapshot encode failed, skipping conflict: {}", e);
                return None;
            }
        };
        let remote_payload = match codec::encode(R::KIND, remote) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(kind = %R::KIND, "snapshot encode failed, skipping conflict: {}", e);
                return None;
            }
        };

        Some(Conflict {
            id: Uuid::new_v4(),
            entity_kind: R::KIND,
            entity_id: local.entity_id(),
            local_version: ConflictVersion {
                payload: local_payload,
                modified_at: local.modified_at(),
                device_label: Some(self.device_label.clone()),
                changes: local.changes_against(remote),
            },
            remote_version: ConflictVersion {
                payload: remote_payload,
                modified_at: remote.modified_at(),
                device_label: None,
                changes: remote.changes_against(local),
            },
            conflict_type: ConflictType::Update,
            detected_at: now,
        })
    }
}

/// Decoded both-sides view of a conflict, built on demand for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConflictDetails {
    Item {
        local: Item,
        remote: Item,
        changes: Vec<FieldChange>,
    },
    Receipt {
        local: Receipt,
        remote: Receipt,
        changes: Vec<FieldChange>,
    },
    Location {
        local: Location,
        remote: Location,
        changes: Vec<FieldChange>,
    },
}

impl ConflictDetails {
    /// Decode both sides of `conflict` into typed records.
    ///
    /// The attached changes are the local version's change list.
    pub fn from_conflict(conflict: &Conflict) -> Result<Self> {
        let changes = conflict.local_version.changes.clone();
        let local = &conflict.local_version.payload;
        let remote = &conflict.remote_version.payload;

        match conflict.entity_kind {
            EntityKind::Item => Ok(ConflictDetails::Item {
                local: codec::decode(EntityKind::Item, local)?,
                remote: codec::decode(EntityKind::Item, remote)?,
                changes,
            }),
            EntityKind::Receipt => Ok(ConflictDetails::Receipt {
                local: codec::decode(EntityKind::Receipt, local)?,
                remote: codec::decode(EntityKind::Receipt, remote)?,
                changes,
            }),
            EntityKind::Location => Ok(ConflictDetails::Location {
                local: codec::decode(EntityKind::Location, local)?,
                remote: codec::decode(EntityKind::Location, remote)?,
                changes,
            }),
        }
    }

    /// Kind of the underlying records.
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            ConflictDetails::Item { .. } => EntityKind::Item,
            ConflictDetails::Receipt { .. } => EntityKind::Receipt,
            ConflictDetails::Location { .. } => EntityKind::Location,
        }
    }

    /// Field-level differences, empty outside items.
    pub fn changes(&self) -> &[FieldChange] {
        match self {
            ConflictDetails::Item { changes, .. }
            | ConflictDetails::Receipt { changes, .. }
            | ConflictDetails::Location { changes, .. } => changes,
        }
    }
}
