//! Time-series transformer: one series' records to ordered chart points
//! with optional symmetric error bands.

use chrono::{DateTime, Utc};

use crate::chart::{ChartPoint, Dataset, DatasetKind, StyleHints};
use crate::group::{self, UnitColorMap};
use crate::record::{DataType, QaRecord};

/// Parameters that render with error bars when the record carries the
/// companion spread value.
const ERROR_BAR_PARAMS: [&str; 3] = ["clipmed", "clipmax", "clipmin"];

/// Companion spread field for the error-bar parameters.
const SPREAD_PARAM: &str = "clipstd";

/// Transform filtered records into per-series point datasets.
///
/// Records lacking the data-type-specific date are excluded — a missing
/// date is never defaulted to "now", which would silently misplace the
/// point on the x axis. Series whose points all drop out are omitted.
pub fn transform(
    filtered: &[&QaRecord],
    data_type: DataType,
    parameter: &str,
    colors: &UnitColorMap,
) -> Vec<Dataset> {
    group::group_series(filtered, data_type, colors)
        .into_iter()
        .filter_map(|series| {
            let mut dated: Vec<(DateTime<Utc>, &QaRecord)> = series
                .records
                .iter()
                .filter_map(|r| data_type.date_of(r).map(|d| (d, *r)))
                .collect();
            if dated.len() < series.records.len() {
                tracing::debug!(
                    series = %series.key,
                    dropped = series.records.len() - dated.len(),
                    "excluding undated points"
                );
            }
            dated.sort_by_key(|(date, _)| *date);

            let points: Vec<ChartPoint> = dated
                .into_iter()
                .filter_map(|(date, record)| point_of(date, record, data_type, parameter))
                .collect();
            if points.is_empty() {
                return None;
            }

            // The encoding is per series: error-bar line when any point has
            // spread, plain scatter otherwise.
            let kind = if points.iter().any(|p| p.std > 0.0) {
                DatasetKind::LineWithErrorBars
            } else {
                DatasetKind::Scatter
            };
            Some(Dataset {
                label: series.key,
                kind,
                in_legend: true,
                data: points,
                style: StyleHints::series(series.color),
            })
        })
        .collect()
}

fn point_of(
    date: DateTime<Utc>,
    record: &QaRecord,
    data_type: DataType,
    parameter: &str,
) -> Option<ChartPoint> {
    let y = match record.parameters.get(parameter) {
        Some(value) if !value.is_finite() => {
            tracing::debug!(parameter, "skipping non-finite value");
            return None;
        }
        Some(value) => *value,
        // Absent parameter plots at zero rather than dropping the exposure.
        None => 0.0,
    };
    let std = if ERROR_BAR_PARAMS.contains(&parameter) {
        record.parameter(SPREAD_PARAM).unwrap_or(0.0)
    } else {
        0.0
    };
    Some(ChartPoint {
        x: data_type.format_chart_date(date),
        y,
        y_min: y - std,
        y_max: y + std,
        std,
        stats: None,
        filter: record.filter.clone(),
        sanity: record.sanity,
    })
}
