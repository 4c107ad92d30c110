//! Series grouping and display-color assignment.
//!
//! A series is one plotted line/group: one unit for calibration data, one
//! object/unit/filter combination for science exposures. Grouping keeps a
//! deterministic key order so the renderer's legend and colors are stable
//! across recomputations.
//!
//! Colors are assigned from a unit's rank in the sorted list of *all units
//! ever seen in the full unfiltered record store*, not from its position
//! among the currently visible series. Toggling other units on or off
//! therefore never changes an existing series' color.

use std::collections::{BTreeSet, HashMap};

use crate::record::{DataType, QaRecord};

/// Fixed 20-color display palette.
pub const TABLEAU_20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Stable unit-to-color assignment, built once per record-store snapshot
/// from the sorted global unit universe and passed explicitly into every
/// transformer.
#[derive(Debug, Clone, Default)]
pub struct UnitColorMap {
    ranks: HashMap<String, usize>,
}

impl UnitColorMap {
    /// Build from the global unit universe. Input order is irrelevant; the
    /// rank comes from the lexicographically sorted, deduplicated list.
    pub fn from_units<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sorted: BTreeSet<String> = units.into_iter().map(Into::into).collect();
        let ranks = sorted
            .into_iter()
            .enumerate()
            .map(|(rank, unit)| (unit, rank))
            .collect();
        Self { ranks }
    }

    /// Palette color for a unit, `None` when the unit is outside the
    /// universe this map was built from.
    pub fn color_of(&self, unit: &str) -> Option<&'static str> {
        self.ranks
            .get(unit)
            .map(|rank| TABLEAU_20[rank % TABLEAU_20.len()])
    }
}

/// One named series with its records in chronological-input order and its
/// resolved display color.
#[derive(Debug)]
pub struct SeriesGroup<'a> {
    /// Deterministic series key (legend label).
    pub key: String,
    /// Records in insertion order; transformers sort by date themselves.
    pub records: Vec<&'a QaRecord>,
    /// Display color (palette entry).
    pub color: &'static str,
}

/// Compute the series key for a record.
///
/// Science keys combine object, unit, and filter with progressive fallback
/// when identity fields are absent; calibration keys are the unit, or the
/// filter when `filter_keyed` grouping is in effect.
fn series_key(record: &QaRecord, data_type: DataType, filter_keyed: bool) -> String {
    if data_type == DataType::Science {
        let filter = record.filter.as_deref().unwrap_or("Unknown");
        match (record.object.as_deref(), record.unit.as_deref()) {
            (Some(object), Some(unit)) => format!("{object} ({unit}, {filter})"),
            (Some(object), None) => format!("{object} ({filter})"),
            (None, Some(unit)) => format!("{unit} ({filter})"),
            (None, None) => filter.to_string(),
        }
    } else if filter_keyed {
        record.filter.clone().unwrap_or_else(|| "Unknown".into())
    } else {
        record.unit.clone().unwrap_or_else(|| "Unknown".into())
    }
}

/// Partition filtered records into ordered series and assign colors.
///
/// Science series keep first-seen order (object identity has no useful
/// total order); calibration series sort lexicographically to keep legacy
/// color/legend expectations. Calibration grouping falls back to filter
/// keys only when no record in the set carries a unit.
pub fn group_series<'a>(
    records: &[&'a QaRecord],
    data_type: DataType,
    colors: &UnitColorMap,
) -> Vec<SeriesGroup<'a>> {
    let filter_keyed =
        data_type != DataType::Science && records.iter().all(|r| r.unit.is_none());

    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<&'a QaRecord>> = HashMap::new();
    for record in records {
        let key = series_key(record, data_type, filter_keyed);
        match buckets.get_mut(&key) {
            Some(bucket) => bucket.push(record),
            None => {
                order.push(key.clone());
                buckets.insert(key, vec![record]);
            }
        }
    }

    if data_type != DataType::Science {
        order.sort();
    }

    order
        .into_iter()
        .enumerate()
        .map(|(idx, key)| {
            let records = buckets.remove(&key).unwrap_or_default();
            let fallback = TABLEAU_20[idx % TABLEAU_20.len()];
            let color = records
                .first()
                .and_then(|r| r.unit.as_deref())
                .and_then(|u| colors.color_of(u))
                .unwrap_or(fallback);
            SeriesGroup {
                key,
                records,
                color,
            }
        })
        .collect()
}
