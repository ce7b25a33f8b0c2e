//! Zone state store
//!
//! Holds the zones of the current gate keyed by id, in the order the snapshot
//! listed them. It is the only state shared between the live channel and the
//! workflows, and it is mutated only through [`ZoneStore::replace_all`] and
//! [`ZoneStore::upsert_by_id`]. Both take the write lock once and replace
//! whole entries, so concurrent sources resolve as last-write-wins per zone.

use indexmap::IndexMap;
use parking_lot::RwLock;
use shared::models::Zone;
use std::sync::Arc;

/// Shared handle to a gate's zones; clones see the same state
#[derive(Debug, Clone, Default)]
pub struct ZoneStore {
    zones: Arc<RwLock<IndexMap<String, Zone>>>,
}

impl ZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection (initial snapshot, reconnect snapshot)
    pub fn replace_all(&self, zones: impl IntoIterator<Item = Zone>) {
        let next: IndexMap<String, Zone> = zones.into_iter().map(|z| (z.id.clone(), z)).collect();
        let count = next.len();
        *self.zones.write() = next;
        tracing::debug!(count, "Zone snapshot applied");
    }

    /// Replace the entry with the same id.
    ///
    /// Unknown ids are ignored, so the collection never grows past the last
    /// snapshot. When both the held and the incoming zone carry a version, an
    /// older incoming version is ignored. Returns whether the update applied.
    pub fn upsert_by_id(&self, zone: Zone) -> bool {
        let mut zones = self.zones.write();
        let Some(held) = zones.get_mut(&zone.id) else {
            tracing::debug!(zone_id = %zone.id, "Ignoring update for unknown zone");
            return false;
        };
        if let (Some(current), Some(incoming)) = (held.version, zone.version) {
            if incoming < current {
                tracing::debug!(
                    zone_id = %zone.id,
                    current,
                    incoming,
                    "Ignoring stale zone update"
                );
                return false;
            }
        }
        *held = zone;
        true
    }

    pub fn get(&self, zone_id: &str) -> Option<Zone> {
        self.zones.read().get(zone_id).cloned()
    }

    pub fn contains(&self, zone_id: &str) -> bool {
        self.zones.read().contains_key(zone_id)
    }

    pub fn len(&self) -> usize {
        self.zones.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.read().is_empty()
    }

    /// All zones in snapshot order
    pub fn snapshot(&self) -> Vec<Zone> {
        self.zones.read().values().cloned().collect()
    }

    /// Filtered view for rendering.
    ///
    /// The view is lazy and restartable: every [`ZoneView::iter`] call reads
    /// the current state again.
    pub fn get_filtered<F>(&self, predicate: F) -> ZoneView<F>
    where
        F: Fn(&Zone) -> bool,
    {
        ZoneView {
            store: self.clone(),
            predicate,
        }
    }

    /// Drop every zone (session end)
    pub fn clear(&self) {
        self.zones.write().clear();
    }
}

/// Lazy filtered view over a [`ZoneStore`]
#[derive(Debug, Clone)]
pub struct ZoneView<F> {
    store: ZoneStore,
    predicate: F,
}

impl<F> ZoneView<F>
where
    F: Fn(&Zone) -> bool,
{
    /// Iterate the zones currently matching the predicate
    pub fn iter(&self) -> impl Iterator<Item = Zone> + '_ {
        self.store
            .snapshot()
            .into_iter()
            .filter(move |z| (self.predicate)(z))
    }

    pub fn to_vec(&self) -> Vec<Zone> {
        self.iter().collect()
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal::Decimal;

    pub(crate) fn zone(id: &str, available_for_visitors: i32) -> Zone {
        Zone {
            id: id.to_string(),
            name: format!("Zone {id}"),
            category_id: "cat_regular".to_string(),
            category_name: None,
            occupied: 0,
            free: available_for_visitors,
            reserved: 0,
            available_for_visitors,
            available_for_subscribers: 0,
            rate_normal: Decimal::new(3, 0),
            rate_special: Decimal::new(5, 0),
            open: true,
            special_active: false,
            version: None,
        }
    }

    #[test]
    fn test_replace_all_keeps_snapshot_order() {
        let store = ZoneStore::new();
        store.replace_all(vec![zone("z3", 1), zone("z1", 1), zone("z2", 1)]);

        let ids: Vec<String> = store.snapshot().into_iter().map(|z| z.id).collect();
        assert_eq!(ids, vec!["z3", "z1", "z2"]);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let store = ZoneStore::new();
        store.replace_all(vec![zone("z1", 2), zone("z2", 4)]);

        assert!(store.upsert_by_id(zone("z1", 1)));

        let zones = store.snapshot();
        assert_eq!(zones[0].id, "z1");
        assert_eq!(zones[0].available_for_visitors, 1);
        assert_eq!(zones[1].available_for_visitors, 4);
    }

    #[test]
    fn test_upsert_never_grows_the_store() {
        let store = ZoneStore::new();
        store.replace_all(vec![zone("z1", 2), zone("z2", 4)]);

        let updates = [("z9", 1), ("z1", 0), ("z2", 3), ("z8", 5), ("z1", 7), ("z2", 2)];
        for (id, available) in updates {
            store.upsert_by_id(zone(id, available));
            assert!(store.len() <= 2);
        }

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("z1").unwrap().available_for_visitors, 7);
        assert_eq!(store.get("z2").unwrap().available_for_visitors, 2);
        assert!(!store.contains("z9"));
    }

    #[test]
    fn test_stale_versions_are_ignored() {
        let store = ZoneStore::new();
        let mut held = zone("z1", 5);
        held.version = Some(10);
        store.replace_all(vec![held]);

        let mut stale = zone("z1", 9);
        stale.version = Some(9);
        assert!(!store.upsert_by_id(stale));
        assert_eq!(store.get("z1").unwrap().available_for_visitors, 5);

        // Unversioned updates fall back to last-write-wins
        assert!(store.upsert_by_id(zone("z1", 4)));
        assert_eq!(store.get("z1").unwrap().available_for_visitors, 4);
    }

    #[test]
    fn test_filtered_view_is_restartable() {
        let store = ZoneStore::new();
        store.replace_all(vec![zone("z1", 2), zone("z2", 0)]);

        let view = store.get_filtered(|z| z.available_for_visitors > 0);
        assert_eq!(view.count(), 1);

        store.upsert_by_id(zone("z2", 3));
        let ids: Vec<String> = view.iter().map(|z| z.id).collect();
        assert_eq!(ids, vec!["z1", "z2"]);
    }
}
