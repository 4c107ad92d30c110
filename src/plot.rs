//! Plot specification: the user-controlled selection state that drives
//! every recomputation.
//!
//! A [`PlotSpec`] is created when a plot panel is added, mutated on every
//! control change, and destroyed with the panel. Derived chart data is never
//! stored on it; the engine recomputes from scratch on every call so that
//! redundant invocations are always safe.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::params::PipelineVersion;
use crate::record::DataType;

/// Visual encoding requested by the user. Box-summary mode is not selected
/// here: it activates automatically when quartile statistics are present and
/// the chart type is not `Histogram`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Time-series points (scatter or error-bar line).
    #[default]
    Line,
    /// Binned distribution of a single parameter.
    Histogram,
}

/// User-chosen selection state for one plot panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSpec {
    /// Which data type this panel shows.
    pub data_type: DataType,
    /// Parameter wire name (must exist in the data type's vocabulary).
    pub parameter: String,
    /// Requested visual encoding.
    #[serde(default)]
    pub chart_type: ChartType,
    /// Selected units; empty means no restriction.
    #[serde(default)]
    pub units: BTreeSet<String>,
    /// Selected optical filters; empty means no restriction.
    #[serde(default)]
    pub filters: BTreeSet<String>,
    /// Selected target objects; empty means no restriction.
    #[serde(default)]
    pub objects: BTreeSet<String>,
    /// Inclusive lower date bound (UTC day).
    #[serde(default)]
    pub date_min: Option<NaiveDate>,
    /// Inclusive upper date bound (UTC day).
    #[serde(default)]
    pub date_max: Option<NaiveDate>,
    /// Selected instrument-log part tags; empty suppresses event overlays.
    #[serde(default)]
    pub inst_log_parts: BTreeSet<String>,
    /// Pipeline generation the panel reads from.
    #[serde(default)]
    pub version: PipelineVersion,
}

impl PlotSpec {
    /// A fresh panel spec with no restrictions.
    pub fn new(data_type: DataType, parameter: impl Into<String>) -> Self {
        Self {
            data_type,
            parameter: parameter.into(),
            chart_type: ChartType::Line,
            units: BTreeSet::new(),
            filters: BTreeSet::new(),
            objects: BTreeSet::new(),
            date_min: None,
            date_max: None,
            inst_log_parts: BTreeSet::new(),
            version: PipelineVersion::V1,
        }
    }

    /// True when either date bound is active.
    pub fn has_date_range(&self) -> bool {
        self.date_min.is_some() || self.date_max.is_some()
    }
}

/// Composite key identifying one fetched snapshot in the record store.
///
/// An explicit struct rather than a concatenated string, so separator
/// ambiguity can never collide two distinct snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    pub data_type: DataType,
    pub parameter: String,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
    pub version: PipelineVersion,
}

impl SnapshotKey {
    /// The snapshot a plot spec reads from.
    pub fn of(spec: &PlotSpec) -> Self {
        Self {
            data_type: spec.data_type,
            parameter: spec.parameter.clone(),
            date_min: spec.date_min,
            date_max: spec.date_max,
            version: spec.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_key_distinguishes_fields_string_keys_confuse() {
        // "bias_clip" + "med" vs "bias" + "clip_med" would collide under
        // underscore-joined string keys.
        let mut a = PlotSpec::new(DataType::Bias, "clipmed");
        a.date_min = NaiveDate::from_ymd_opt(2024, 1, 1);
        let mut b = a.clone();
        b.version = PipelineVersion::V2;
        assert_ne!(SnapshotKey::of(&a), SnapshotKey::of(&b));
        assert_eq!(SnapshotKey::of(&a), SnapshotKey::of(&a.clone()));
    }

    #[test]
    fn test_plot_spec_roundtrips_through_json() {
        let mut spec = PlotSpec::new(DataType::Science, "seeing");
        spec.units.insert("7DT01".into());
        spec.chart_type = ChartType::Histogram;
        let json = serde_json::to_string(&spec).unwrap();
        let back: PlotSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
    }
}
