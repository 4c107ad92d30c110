//! Box-summary transformer: paired box+whisker encodings from records that
//! carry precomputed quartile statistics.
//!
//! Each series becomes two overlapping datasets: a legendless wide-line
//! "box" spanning the interquartile range, and a thin "whiskers" dataset
//! spanning the full range that carries the visible legend label. The two
//! stay index-aligned point-for-point so hover interactions can recover the
//! full five-number summary from either one.

use chrono::{DateTime, Utc};

use crate::chart::{ChartPoint, Dataset, DatasetKind, StyleHints};
use crate::group::{self, UnitColorMap};
use crate::record::{DataType, FiveNumber, QaRecord};

/// Whether the filtered set should render in box-summary mode: at least one
/// record carries the complete four-quantile statistics.
pub fn applies(filtered: &[&QaRecord]) -> bool {
    filtered.iter().any(|r| r.five_number().is_some())
}

/// Transform pre-aggregated records into paired box+whisker datasets.
///
/// Records missing any of min/q1/q3/max are excluded entirely, never
/// zero-filled. Undated records are excluded like everywhere else.
pub fn transform(
    filtered: &[&QaRecord],
    data_type: DataType,
    colors: &UnitColorMap,
) -> Vec<Dataset> {
    let complete: Vec<&QaRecord> = filtered
        .iter()
        .copied()
        .filter(|r| r.five_number().is_some())
        .collect();

    let mut datasets = Vec::new();
    for series in group::group_series(&complete, data_type, colors) {
        let mut dated: Vec<(DateTime<Utc>, FiveNumber)> = series
            .records
            .iter()
            .filter_map(|r| {
                let date = data_type.date_of(r)?;
                let stats = r.five_number()?;
                Some((date, stats))
            })
            .collect();
        dated.sort_by_key(|(date, _)| *date);
        if dated.is_empty() {
            continue;
        }

        let point = |date: &DateTime<Utc>, stats: &FiveNumber, lo: f64, hi: f64| ChartPoint {
            x: data_type.format_chart_date(*date),
            y: stats.median,
            y_min: lo,
            y_max: hi,
            std: (hi - lo) / 2.0,
            stats: Some(*stats),
            filter: None,
            sanity: None,
        };

        let box_points: Vec<ChartPoint> = dated
            .iter()
            .map(|(date, stats)| point(date, stats, stats.q1, stats.q3))
            .collect();
        let whisker_points: Vec<ChartPoint> = dated
            .iter()
            .map(|(date, stats)| point(date, stats, stats.min, stats.max))
            .collect();

        // Box first, whiskers on top; only the whiskers enter the legend.
        datasets.push(Dataset {
            label: String::new(),
            kind: DatasetKind::LineWithErrorBars,
            in_legend: false,
            data: box_points,
            style: StyleHints::box_range(series.color),
        });
        datasets.push(Dataset {
            label: series.key,
            kind: DatasetKind::LineWithErrorBars,
            in_legend: true,
            data: whisker_points,
            style: StyleHints::whiskers(series.color),
        });
    }
    datasets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(unit: &str, run_date: &str, stats: serde_json::Value) -> QaRecord {
        serde_json::from_value(serde_json::json!({
            "qa_type": "bias",
            "unit": unit,
            "run_date": format!("{run_date}T00:00:00Z"),
            "stats": stats,
        }))
        .unwrap()
    }

    fn full_stats() -> serde_json::Value {
        serde_json::json!({ "min": 1.0, "q1": 2.0, "median": 3.0, "q3": 4.0, "max": 5.0 })
    }

    #[test]
    fn test_applies_when_any_record_has_full_stats() {
        let with = boxed("U1", "2024-01-05", full_stats());
        let without: QaRecord = serde_json::from_value(serde_json::json!({
            "qa_type": "bias", "unit": "U1",
        }))
        .unwrap();
        assert!(applies(&[&without, &with]));
        assert!(!applies(&[&without]));
    }

    #[test]
    fn test_paired_datasets_share_length_and_dates() {
        let records = vec![
            boxed("U1", "2024-01-05", full_stats()),
            boxed("U1", "2024-01-06", full_stats()),
        ];
        let refs: Vec<&QaRecord> = records.iter().collect();
        let datasets = transform(&refs, DataType::Bias, &UnitColorMap::default());
        assert_eq!(datasets.len(), 2);

        let (bx, whiskers) = (&datasets[0], &datasets[1]);
        assert_eq!(bx.data.len(), whiskers.data.len());
        for (b, w) in bx.data.iter().zip(&whiskers.data) {
            assert_eq!(b.x, w.x);
            assert_eq!(b.stats, w.stats);
        }
        assert_eq!(bx.data[0].x, "2024-01-05");
        assert_eq!(bx.data[1].x, "2024-01-06");
    }

    #[test]
    fn test_box_encodes_iqr_whiskers_encode_range() {
        let records = vec![boxed("U1", "2024-01-05", full_stats())];
        let refs: Vec<&QaRecord> = records.iter().collect();
        let datasets = transform(&refs, DataType::Bias, &UnitColorMap::default());

        let bx = &datasets[0];
        assert!(!bx.in_legend);
        assert_eq!(bx.label, "");
        assert_eq!((bx.data[0].y_min, bx.data[0].y_max), (2.0, 4.0));
        assert_eq!(bx.data[0].std, 1.0);
        assert_eq!(bx.style.error_bar_whisker_size, 0);

        let whiskers = &datasets[1];
        assert!(whiskers.in_legend);
        assert_eq!(whiskers.label, "U1");
        assert_eq!((whiskers.data[0].y_min, whiskers.data[0].y_max), (1.0, 5.0));
        assert_eq!(whiskers.data[0].std, 2.0);
        assert_eq!(whiskers.data[0].y, 3.0);
        assert_eq!(whiskers.style.error_bar_whisker_size, 3);
    }

    #[test]
    fn test_median_falls_back_to_iqr_midpoint() {
        let records = vec![boxed(
            "U1",
            "2024-01-05",
            serde_json::json!({ "min": 0.0, "q1": 2.0, "q3": 6.0, "max": 10.0 }),
        )];
        let refs: Vec<&QaRecord> = records.iter().collect();
        let datasets = transform(&refs, DataType::Bias, &UnitColorMap::default());
        assert_eq!(datasets[1].data[0].y, 4.0);
    }

    #[test]
    fn test_incomplete_stats_excluded_not_zero_filled() {
        let records = vec![
            boxed("U1", "2024-01-05", full_stats()),
            boxed("U1", "2024-01-06", serde_json::json!({ "q1": 2.0, "q3": 4.0 })),
        ];
        let refs: Vec<&QaRecord> = records.iter().collect();
        let datasets = transform(&refs, DataType::Bias, &UnitColorMap::default());
        assert_eq!(datasets[0].data.len(), 1);
        assert_eq!(datasets[1].data.len(), 1);
    }

    #[test]
    fn test_each_series_gets_its_own_pair() {
        let records = vec![
            boxed("U1", "2024-01-05", full_stats()),
            boxed("U2", "2024-01-05", full_stats()),
        ];
        let refs: Vec<&QaRecord> = records.iter().collect();
        let colors = UnitColorMap::from_units(["U1", "U2"]);
        let datasets = transform(&refs, DataType::Bias, &colors);
        assert_eq!(datasets.len(), 4);
        let labels: Vec<&str> = datasets.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["", "U1", "", "U2"]);
        // Box and whisker datasets of a series share the series color.
        assert_eq!(datasets[0].style.color, datasets[1].style.color);
        assert_ne!(datasets[1].style.color, datasets[3].style.color);
    }
}
