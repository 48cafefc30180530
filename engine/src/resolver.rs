//! Conflict resolution orchestration and bookkeeping.
//!
//! [`ConflictService`] is the stateful owner: it runs detection, turns a
//! caller's directive into a resolved payload, persists through the
//! kind-matched repository, and keeps the active-conflict set, the
//! resolution history, and the last-resolved timestamp.
//!
//! All state mutation is serialized through one `tokio::sync::Mutex`, held
//! across the repository await. A failed resolution mutates nothing: the
//! conflict stays active and no history entry is written, so retrying is
//! always safe.

use crate::codec;
use crate::conflict::{Conflict, ConflictDetails, ConflictDetector};
use crate::error::Result;
use crate::merge::{self, MergeStrategy};
use crate::record::{EntityKind, RecordSet};
use crate::repository::{ItemRepository, LocationRepository, ReceiptRepository};
use crate::{ConflictId, DeviceLabel, Payload, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The caller's chosen way to settle a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "directive", rename_all = "camelCase")]
pub enum ResolutionDirective {
    /// Persist the local version's payload as-is
    KeepLocal,
    /// Persist the remote version's payload as-is
    KeepRemote,
    /// Combine both versions via a merge strategy
    Merge { strategy: MergeStrategy },
    /// Persist caller-supplied bytes verbatim
    Custom { payload: Payload },
}

impl ResolutionDirective {
    /// Human-readable name for display.
    pub fn display_name(&self) -> String {
        match self {
            ResolutionDirective::KeepLocal => "Keep Local Version".into(),
            ResolutionDirective::KeepRemote => "Keep Remote Version".into(),
            ResolutionDirective::Merge { strategy } => {
                format!("Merge ({})", strategy.display_name())
            }
            ResolutionDirective::Custom { .. } => "Custom Resolution".into(),
        }
    }
}

/// Outcome of one successful resolution. Kept in the in-memory history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub conflict_id: ConflictId,
    pub directive_applied: ResolutionDirective,
    pub resolved_payload: Payload,
    /// When the resolution was applied (milliseconds since epoch)
    pub resolved_at: Timestamp,
}

/// Bookkeeping behind the service mutex.
#[derive(Debug, Default)]
struct ServiceState {
    active: Vec<Conflict>,
    history: HashMap<ConflictId, ResolutionResult>,
    last_resolved_at: Option<Timestamp>,
}

/// Resets the advisory busy flag when a resolution ends, error paths
/// included.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Detects and resolves sync conflicts for one device.
///
/// Single instance per app; clones of the repository handles are cheap
/// `Arc`s. History lives for the process lifetime only - durable history
/// belongs to an external store.
pub struct ConflictService {
    detector: ConflictDetector,
    items: Arc<dyn ItemRepository>,
    receipts: Arc<dyn ReceiptRepository>,
    locations: Arc<dyn LocationRepository>,
    state: Mutex<ServiceState>,
    resolving: AtomicBool,
}

impl ConflictService {
    /// Create a service resolving into the given repositories.
    pub fn new(
        device_label: impl Into<DeviceLabel>,
        items: Arc<dyn ItemRepository>,
        receipts: Arc<dyn ReceiptRepository>,
        locations: Arc<dyn LocationRepository>,
    ) -> Self {
        Self {
            detector: ConflictDetector::new(device_label),
            items,
            receipts,
            locations,
            state: Mutex::new(ServiceState::default()),
            resolving: AtomicBool::new(false),
        }
    }

    /// Compare both record sets and replace the active-conflict set with
    /// the result.
    ///
    /// Not additive: unresolved conflicts from a previous detection run are
    /// discarded unless the caller re-merges them.
    pub async fn detect_conflicts(&self, local: &RecordSet, remote: &RecordSet) -> Vec<Conflict> {
        let conflicts = self.detector.detect(local, remote, now_millis());
        tracing::debug!(
            count = conflicts.len(),
            local_records = local.len(),
            remote_records = remote.len(),
            "conflict detection finished"
        );

        let mut state = self.state.lock().await;
        state.active = conflicts.clone();
        conflicts
    }

    /// Resolve one conflict with `directive`.
    ///
    /// On success the conflict leaves the active set and a history entry is
    /// written; on failure neither happens. Membership in the active set is
    /// not a precondition.
    pub async fn resolve(
        &self,
        conflict: &Conflict,
        directive: ResolutionDirective,
    ) -> Result<ResolutionResult> {
        let mut state = self.state.lock().await;
        self.resolve_locked(&mut state, conflict, directive).await
    }

    /// Resolve every active conflict with the same directive, strictly
    /// sequentially.
    ///
    /// The first failure aborts the batch and propagates; already-resolved
    /// conflicts keep their bookkeeping, the failed one stays active.
    pub async fn resolve_all(
        &self,
        directive: ResolutionDirective,
    ) -> Result<Vec<ResolutionResult>> {
        let mut state = self.state.lock().await;
        let pending = state.active.clone();

        let mut results = Vec::with_capacity(pending.len());
        for conflict in &pending {
            let result = self
                .resolve_locked(&mut state, conflict, directive.clone())
                .await?;
            results.push(result);
        }
        Ok(results)
    }

    async fn resolve_locked(
        &self,
        state: &mut ServiceState,
        conflict: &Conflict,
        directive: ResolutionDirective,
    ) -> Result<ResolutionResult> {
        self.resolving.store(true, Ordering::SeqCst);
        let _busy = BusyGuard(&self.resolving);

        let now = now_millis();
        let payload = match &directive {
            ResolutionDirective::KeepLocal => conflict.local_version.payload.clone(),
            ResolutionDirective::KeepRemote => conflict.remote_version.payload.clone(),
            ResolutionDirective::Merge { strategy } => {
                merge::resolve_payload(conflict, strategy, now)?
            }
            ResolutionDirective::Custom { payload } => payload.clone(),
        };

        if let Err(e) = self.persist(conflict.entity_kind, &payload).await {
            tracing::warn!(
                conflict_id = %conflict.id,
                kind = %conflict.entity_kind,
                "resolution failed: {}",
                e
            );
            return Err(e);
        }

        let result = ResolutionResult {
            conflict_id: conflict.id,
            directive_applied: directive,
            resolved_payload: payload,
            resolved_at: now,
        };

        state.active.retain(|c| c.id != conflict.id);
        state.history.insert(conflict.id, result.clone());
        state.last_resolved_at = Some(now);

        tracing::info!(
            conflict_id = %conflict.id,
            kind = %conflict.entity_kind,
            directive = %result.directive_applied.display_name(),
            "conflict resolved"
        );
        Ok(result)
    }

    /// Decode the resolved payload into its typed record and save it
    /// through the kind-matched repository.
    async fn persist(&self, kind: EntityKind, payload: &[u8]) -> Result<()> {
        match kind {
            EntityKind::Item => self.items.save(codec::decode(kind, payload)?).await,
            EntityKind::Receipt => self.receipts.save(codec::decode(kind, payload)?).await,
            EntityKind::Location => self.locations.save(codec::decode(kind, payload)?).await,
        }
    }

    /// Decode both sides of a conflict for presentation.
    pub fn conflict_details(&self, conflict: &Conflict) -> Result<ConflictDetails> {
        ConflictDetails::from_conflict(conflict)
    }

    /// Snapshot of the active-conflict set.
    pub async fn active_conflicts(&self) -> Vec<Conflict> {
        self.state.lock().await.active.clone()
    }

    /// Number of active conflicts.
    pub async fn conflict_count(&self) -> usize {
        self.state.lock().await.active.len()
    }

    /// Whether any conflicts are waiting for resolution.
    pub async fn has_active_conflicts(&self) -> bool {
        !self.state.lock().await.active.is_empty()
    }

    /// Snapshot of the resolution history, keyed by conflict id.
    pub async fn history(&self) -> HashMap<ConflictId, ResolutionResult> {
        self.state.lock().await.history.clone()
    }

    /// When the last successful resolution happened.
    pub async fn last_resolved_at(&self) -> Option<Timestamp> {
        self.state.lock().await.last_resolved_at
    }

    /// Advisory busy indicator for UI display. Not a lock; the service
    /// mutex is the correctness boundary.
    pub fn is_resolving(&self) -> bool {
        self.resolving.load(Ordering::SeqCst)
    }
}

fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
