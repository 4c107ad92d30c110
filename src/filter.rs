//! Selection filter: reduce a record snapshot to the subset matching the
//! plot's selections.
//!
//! Pure and side-effect free. An empty selection set means "no restriction";
//! an empty result is returned (never an error) when nothing matches.

use crate::plot::PlotSpec;
use crate::record::QaRecord;

/// Apply the plot's selections to a record snapshot.
///
/// Filter-name selections only apply to flats and science exposures, object
/// selections only to science. When a date range is active, records lacking
/// the data-type-specific date are dropped; comparison is on the UTC day,
/// inclusive at both bounds.
pub fn apply<'a>(records: &'a [QaRecord], spec: &PlotSpec) -> Vec<&'a QaRecord> {
    records.iter().filter(|r| passes(r, spec)).collect()
}

fn passes(record: &QaRecord, spec: &PlotSpec) -> bool {
    if record.qa_type != spec.data_type {
        return false;
    }

    if !spec.units.is_empty() {
        match &record.unit {
            Some(unit) if spec.units.contains(unit) => {}
            _ => return false,
        }
    }

    if spec.data_type.uses_filters() && !spec.filters.is_empty() {
        match &record.filter {
            Some(filter) if spec.filters.contains(filter) => {}
            _ => return false,
        }
    }

    if spec.data_type.uses_objects() && !spec.objects.is_empty() {
        match &record.object {
            Some(object) if spec.objects.contains(object) => {}
            _ => return false,
        }
    }

    if spec.has_date_range() {
        let Some(day) = spec.data_type.day_of(record) else {
            return false;
        };
        if spec.date_min.is_some_and(|min| day < min) {
            return false;
        }
        if spec.date_max.is_some_and(|max| day > max) {
            return false;
        }
    }

    true
}
