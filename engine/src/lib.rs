//! # Tally Engine
//!
//! Conflict detection and resolution for a local-first inventory app.
//!
//! After offline edits on multiple devices, the local and remote copies of a
//! record can diverge. This crate compares both sides, reports the
//! disagreements as conflicts, and settles each one according to a
//! caller-chosen directive, persisting the winner through a repository seam.
//!
//! ## Design Principles
//!
//! - **No network**: the sync layer fetches record sets; the engine never
//!   performs I/O beyond the repository `save` it is handed
//! - **Closed record union**: Item / Receipt / Location, dispatched by a
//!   compile-time-exhaustive enum
//! - **Pure core, stateful shell**: detection, diffing, and merging are
//!   pure functions taking timestamps as arguments; only
//!   [`ConflictService`] holds state, behind a mutex
//! - **Atomic bookkeeping**: a failed resolution leaves the conflict active
//!   and writes no history, so retrying is always safe
//!
//! ## Core Concepts
//!
//! ### Conflicts
//!
//! Detection pairs same-id records from both sides and emits a [`Conflict`]
//! whenever their modification timestamps differ. Each conflict carries both
//! sides as opaque encoded snapshots plus, for items, a field-level diff.
//! Records present on only one side are not conflicts; create/delete
//! reconciliation belongs to the sync layer.
//!
//! ### Directives and strategies
//!
//! A [`ResolutionDirective`] settles a conflict: keep one side, supply a
//! custom payload, or merge via a [`MergeStrategy`]. `LatestWins` takes the
//! newer side (ties favor local); `FieldLevel` combines both items field by
//! field, driven by the same table that powers diffing.
//!
//! ### History
//!
//! Successful resolutions land in an in-memory history keyed by conflict id.
//! It lives for the process lifetime only; durable history belongs to an
//! external store.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tally_engine::{
//!     ConflictService, InMemoryItemRepository, InMemoryLocationRepository,
//!     InMemoryReceiptRepository, Item, RecordSet, ResolutionDirective,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = ConflictService::new(
//!     "my-phone",
//!     Arc::new(InMemoryItemRepository::new()),
//!     Arc::new(InMemoryReceiptRepository::new()),
//!     Arc::new(InMemoryLocationRepository::new()),
//! );
//!
//! // Two copies of the same item, edited on different devices
//! let local = Item::new("Laptop", 1000);
//! let mut remote = local.clone();
//! remote.name = "Laptop Pro".into();
//! remote.modified_at = 6000;
//!
//! let conflicts = service
//!     .detect_conflicts(
//!         &RecordSet::new().with_items(vec![local]),
//!         &RecordSet::new().with_items(vec![remote]),
//!     )
//!     .await;
//! assert_eq!(conflicts.len(), 1);
//!
//! let result = service
//!     .resolve(&conflicts[0], ResolutionDirective::KeepRemote)
//!     .await
//!     .unwrap();
//! assert_eq!(result.conflict_id, conflicts[0].id);
//! assert!(!service.has_active_conflicts().await);
//! # }
//! ```

pub mod codec;
pub mod conflict;
pub mod error;
pub mod fields;
pub mod merge;
pub mod record;
pub mod repository;
pub mod resolver;

// Re-export main types at crate root
pub use conflict::{
    Conflict, ConflictDetails, ConflictDetector, ConflictType, ConflictVersion, FieldChange,
};
pub use error::{Error, Result};
pub use fields::{diff_items, ItemField};
pub use merge::{resolve_payload, FieldPick, FieldResolution, MergeStrategy};
pub use record::{EntityKind, Item, Location, Receipt, RecordSet};
pub use repository::{
    FailingItemRepository, InMemoryItemRepository, InMemoryLocationRepository,
    InMemoryReceiptRepository, ItemRepository, LocationRepository, ReceiptRepository,
};
pub use resolver::{ConflictService, ResolutionDirective, ResolutionResult};

/// Type aliases for clarity
pub type Timestamp = i64;
pub type EntityId = uuid::Uuid;
pub type ConflictId = uuid::Uuid;
pub type DeviceLabel = String;
pub type Payload = Vec<u8>;
