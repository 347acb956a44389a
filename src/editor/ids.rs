//! Record identity for draft items
//!
//! Items created in the editor carry a draft id until the store assigns
//! a real one. The synchronizer uses the distinction to decide between
//! insert and update.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Identifier of a template, question or option
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordId {
    /// Generated in-session, never seen by the store
    Draft(Uuid),
    /// Assigned by the store
    Stored(String),
}

impl RecordId {
    pub fn stored(id: impl Into<String>) -> Self {
        Self::Stored(id.into())
    }

    /// The store-side id, if this record has been persisted
    pub fn as_stored(&self) -> Option<&str> {
        match self {
            Self::Stored(id) => Some(id),
            Self::Draft(_) => None,
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft(uuid) => write!(f, "draft:{}", uuid),
            Self::Stored(id) => write!(f, "{}", id),
        }
    }
}

/// Store ids assigned during a save, keyed by the id the draft used
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMapping {
    pub template: Option<String>,
    pub records: HashMap<RecordId, String>,
}

impl IdMapping {
    pub fn record(&mut self, draft_id: &RecordId, stored_id: impl Into<String>) {
        self.records.insert(draft_id.clone(), stored_id.into());
    }

    /// Resolve a draft id to its stored form; ids without a mapping are kept
    pub fn resolve(&self, id: &RecordId) -> RecordId {
        match self.records.get(id) {
            Some(stored) => RecordId::Stored(stored.clone()),
            None => id.clone(),
        }
    }

    pub fn extend(&mut self, other: IdMapping) {
        if other.template.is_some() {
            self.template = other.template;
        }
        self.records.extend(other.records);
    }
}

/// Source of fresh draft ids
///
/// Injected into the editor so ids stay unique regardless of call timing.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> RecordId;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> RecordId {
        RecordId::Draft(Uuid::new_v4())
    }
}

/// Deterministic ids (1, 2, 3, ...) encoded as UUIDs
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> RecordId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        RecordId::Draft(Uuid::from_u128(n as u128))
    }
}
