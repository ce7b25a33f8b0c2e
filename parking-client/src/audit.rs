//! Audit log fed by the live channel
//!
//! Keeps the newest entries first, capped at a fixed capacity.

use parking_lot::RwLock;
use shared::models::{AuditEntry, Zone};
use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of entries kept
pub const DEFAULT_CAPACITY: usize = 20;

/// Who produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditSource {
    /// `admin-update` pushed by the server
    Admin,
    /// Derived from a `zone-update`
    System,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub source: AuditSource,
    pub entry: AuditEntry,
}

/// Shared, bounded audit log; clones see the same entries
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: Arc<RwLock<VecDeque<AuditRecord>>>,
    capacity: usize,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record an admin action
    pub fn push(&self, entry: AuditEntry) {
        self.insert(AuditRecord {
            source: AuditSource::Admin,
            entry,
        });
    }

    /// Record a zone change as a system entry
    pub fn push_zone_update(&self, zone: &Zone) {
        let details = serde_json::json!({
            "name": zone.name,
            "occupied": zone.occupied,
            "free": zone.free,
            "availableForVisitors": zone.available_for_visitors,
            "availableForSubscribers": zone.available_for_subscribers,
        });
        self.insert(AuditRecord {
            source: AuditSource::System,
            entry: AuditEntry {
                admin_id: "system".to_string(),
                action: "zone-updated".to_string(),
                target_type: "zone".to_string(),
                target_id: zone.id.clone(),
                details: Some(details),
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
        });
    }

    fn insert(&self, record: AuditRecord) {
        let mut entries = self.entries.write();
        entries.push_front(record);
        entries.truncate(self.capacity);
    }

    /// Entries, newest first
    pub fn entries(&self) -> Vec<AuditRecord> {
        self.entries.read().iter().cloned().collect()
    }

    /// Entries from one source, newest first
    pub fn entries_from(&self, source: AuditSource) -> Vec<AuditRecord> {
        self.entries
            .read()
            .iter()
            .filter(|r| r.source == source)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
