//! Chart-ready output model and the engine entry point.
//!
//! Everything here is renderer-agnostic data: points, datasets, styling
//! hints, and overlay annotations, serialized in the camelCase shape the
//! charting layer consumes. [`build_chart`] is the one call that turns a
//! plot spec plus a record snapshot into a [`ChartOutcome`]; it recomputes
//! from scratch every time, so repeated invocations with the same inputs are
//! always safe.

use serde::{Deserialize, Serialize};

use crate::annotate::{self, Annotation};
use crate::error::Result;
use crate::group::{UnitColorMap, TABLEAU_20};
use crate::params::{self, ParamInfo};
use crate::plot::{ChartType, PlotSpec};
use crate::record::{CutoffConfig, FiveNumber, InstrumentLog, QaRecord};
use crate::{boxsummary, filter, histogram, timeseries};

/// One rendered point. `y_min`/`y_max` carry the error band; `std` is the
/// half-width the band was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// Chart-axis date string (day or full instant, per data type).
    pub x: String,
    pub y: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub std: f64,
    /// Full five-number summary, present only in box-summary mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<FiveNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanity: Option<bool>,
}

/// Visual encoding of one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetKind {
    /// Connected points with vertical error bars.
    #[serde(rename = "lineWithErrorBars")]
    LineWithErrorBars,
    /// Plain points.
    #[serde(rename = "scatter")]
    Scatter,
}

/// Static styling handed to the renderer alongside each dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleHints {
    pub color: String,
    pub show_line: bool,
    pub point_radius: u8,
    pub error_bar_whisker_size: u8,
    pub error_bar_line_width: u8,
}

impl StyleHints {
    /// Ordinary time-series dataset.
    pub fn series(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            show_line: false,
            point_radius: 3,
            error_bar_whisker_size: 3,
            error_bar_line_width: 1,
        }
    }

    /// Interquartile "box": a wide whiskerless error bar.
    pub fn box_range(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            show_line: false,
            point_radius: 0,
            error_bar_whisker_size: 0,
            error_bar_line_width: 4,
        }
    }

    /// Min-to-max whiskers drawn over the box.
    pub fn whiskers(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            show_line: false,
            point_radius: 0,
            error_bar_whisker_size: 3,
            error_bar_line_width: 1,
        }
    }
}

/// One series dataset in a time-series or box-summary chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub kind: DatasetKind,
    /// Whether the dataset appears in the legend (box halves do not).
    pub in_legend: bool,
    pub data: Vec<ChartPoint>,
    pub style: StyleHints,
}

/// The single bar dataset of a histogram chart, with per-bin palette
/// colors (translucent fill over a solid border).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramDataset {
    pub label: String,
    pub data: Vec<u64>,
    pub background_color: Vec<String>,
    pub border_color: Vec<String>,
    pub border_width: u8,
}

impl HistogramDataset {
    fn new(param: &ParamInfo, counts: Vec<u64>) -> Self {
        let border_color: Vec<String> = (0..counts.len())
            .map(|i| TABLEAU_20[i % TABLEAU_20.len()].to_string())
            .collect();
        let background_color = border_color.iter().map(|c| format!("{c}80")).collect();
        Self {
            label: format!("{} Distribution", param.label),
            data: counts,
            background_color,
            border_color,
            border_width: 1,
        }
    }
}

/// Distribution statistics shown beside a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
}

/// A complete renderable chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chart", rename_all = "lowercase")]
pub enum ChartSpec {
    /// Time-series or box-summary chart.
    Series {
        datasets: Vec<Dataset>,
        annotations: Vec<Annotation>,
    },
    /// Binned distribution chart. Histograms carry no annotations: cutoff
    /// and event lines only make sense on a time axis.
    Histogram {
        labels: Vec<String>,
        datasets: Vec<HistogramDataset>,
        statistics: Statistics,
    },
}

/// Why a chart came out empty. None of these is an error: an empty chart is
/// a legitimate outcome the UI reports as "no data".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyCause {
    /// The snapshot itself holds no records.
    NoRecords,
    /// Records exist but the selection filtered all of them out.
    NothingSelected,
    /// Selected records exist but none yields a usable value.
    NoValidValues,
}

/// Result of one chart computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "lowercase")]
pub enum ChartOutcome {
    Ready(ChartSpec),
    Empty(EmptyCause),
}

/// Everything a chart computation reads besides the plot spec itself. All
/// references are immutable: the engine never writes back into the store.
#[derive(Debug, Clone, Copy)]
pub struct ChartInputs<'a> {
    /// The snapshot the spec's key resolves to.
    pub records: &'a [QaRecord],
    /// Stable unit-to-color assignment from the global unit universe.
    pub colors: &'a UnitColorMap,
    pub inst_log: Option<&'a InstrumentLog>,
    pub cutoffs: Option<&'a CutoffConfig>,
}

/// Compute the chart for one plot spec.
///
/// The parameter name is validated against the data type's vocabulary
/// before any numeric work. Box-summary mode activates automatically when
/// the selected records carry quartile statistics and the requested chart
/// type is not a histogram.
pub fn build_chart(spec: &PlotSpec, inputs: &ChartInputs<'_>) -> Result<ChartOutcome> {
    let param = params::validate(spec.data_type, spec.version, &spec.parameter)?;

    if inputs.records.is_empty() {
        return Ok(ChartOutcome::Empty(EmptyCause::NoRecords));
    }
    let filtered = filter::apply(inputs.records, spec);
    if filtered.is_empty() {
        return Ok(ChartOutcome::Empty(EmptyCause::NothingSelected));
    }
    tracing::debug!(
        data_type = %spec.data_type,
        parameter = %spec.parameter,
        selected = filtered.len(),
        of = inputs.records.len(),
        "building chart"
    );

    if spec.chart_type == ChartType::Histogram {
        let Some(hist) = histogram::transform(&filtered, param) else {
            return Ok(ChartOutcome::Empty(EmptyCause::NoValidValues));
        };
        return Ok(ChartOutcome::Ready(ChartSpec::Histogram {
            labels: hist.labels,
            datasets: vec![HistogramDataset::new(param, hist.counts)],
            statistics: hist.statistics,
        }));
    }

    let datasets = if boxsummary::applies(&filtered) {
        boxsummary::transform(&filtered, spec.data_type, inputs.colors)
    } else {
        timeseries::transform(&filtered, spec.data_type, &spec.parameter, inputs.colors)
    };
    if datasets.is_empty() {
        return Ok(ChartOutcome::Empty(EmptyCause::NoValidValues));
    }
    let annotations = annotate::compose(spec, &filtered, inputs.inst_log, inputs.cutoffs);
    Ok(ChartOutcome::Ready(ChartSpec::Series {
        datasets,
        annotations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QaError;
    use crate::record::DataType;

    fn bias(unit: &str, day: &str, clipmed: f64) -> QaRecord {
        serde_json::from_value(serde_json::json!({
            "qa_type": "bias",
            "unit": unit,
            "run_date": format!("{day}T00:00:00Z"),
            "parameters": { "clipmed": clipmed },
        }))
        .unwrap()
    }

    fn inputs<'a>(records: &'a [QaRecord], colors: &'a UnitColorMap) -> ChartInputs<'a> {
        ChartInputs {
            records,
            colors,
            inst_log: None,
            cutoffs: None,
        }
    }

    #[test]
    fn test_unknown_parameter_rejected_before_filtering() {
        let spec = PlotSpec::new(DataType::Bias, "seeing");
        let colors = UnitColorMap::default();
        let err = build_chart(&spec, &inputs(&[], &colors)).unwrap_err();
        assert!(matches!(err, QaError::UnknownParameter { .. }));
    }

    #[test]
    fn test_empty_causes_are_distinguished() {
        let colors = UnitColorMap::default();
        let spec = PlotSpec::new(DataType::Bias, "clipmed");
        assert_eq!(
            build_chart(&spec, &inputs(&[], &colors)).unwrap(),
            ChartOutcome::Empty(EmptyCause::NoRecords)
        );

        let records = vec![bias("7DT01", "2024-01-05", 512.0)];
        let mut narrowed = spec.clone();
        narrowed.units.insert("7DT99".into());
        assert_eq!(
            build_chart(&narrowed, &inputs(&records, &colors)).unwrap(),
            ChartOutcome::Empty(EmptyCause::NothingSelected)
        );

        // Selected but undated: the line path yields no plottable point.
        let undated: Vec<QaRecord> = vec![serde_json::from_value(serde_json::json!({
            "qa_type": "bias", "unit": "7DT01",
            "parameters": { "clipmed": 512.0 },
        }))
        .unwrap()];
        assert_eq!(
            build_chart(&spec, &inputs(&undated, &colors)).unwrap(),
            ChartOutcome::Empty(EmptyCause::NoValidValues)
        );
    }

    #[test]
    fn test_line_path_produces_series_chart() {
        let records = vec![
            bias("7DT01", "2024-01-05", 512.0),
            bias("7DT02", "2024-01-05", 515.0),
        ];
        let colors = UnitColorMap::from_units(["7DT01", "7DT02"]);
        let spec = PlotSpec::new(DataType::Bias, "clipmed");
        let outcome = build_chart(&spec, &inputs(&records, &colors)).unwrap();
        let ChartOutcome::Ready(ChartSpec::Series { datasets, annotations }) = outcome else {
            panic!("expected a series chart");
        };
        assert_eq!(datasets.len(), 2);
        assert!(annotations.is_empty());
    }

    #[test]
    fn test_histogram_path_has_no_annotations_field() {
        let records = vec![
            bias("7DT01", "2023-01-05", 510.0),
            bias("7DT01", "2024-01-05", 514.0),
        ];
        let colors = UnitColorMap::from_units(["7DT01"]);
        let mut spec = PlotSpec::new(DataType::Bias, "clipmed");
        spec.chart_type = ChartType::Histogram;
        let outcome = build_chart(&spec, &inputs(&records, &colors)).unwrap();
        let ChartOutcome::Ready(ChartSpec::Histogram { labels, datasets, .. }) = outcome else {
            panic!("expected a histogram chart");
        };
        assert_eq!(labels.len(), datasets[0].data.len());
        assert_eq!(datasets[0].label, "CLIPMED Distribution");
        assert_eq!(datasets[0].background_color[0], "#1f77b480");
        assert_eq!(datasets[0].border_color[0], "#1f77b4");
    }

    #[test]
    fn test_box_summary_auto_detected() {
        let records: Vec<QaRecord> = vec![serde_json::from_value(serde_json::json!({
            "qa_type": "bias", "unit": "7DT01",
            "run_date": "2024-01-05T00:00:00Z",
            "stats": { "min": 1.0, "q1": 2.0, "median": 3.0, "q3": 4.0, "max": 5.0 },
        }))
        .unwrap()];
        let colors = UnitColorMap::from_units(["7DT01"]);
        let spec = PlotSpec::new(DataType::Bias, "clipmed");
        let outcome = build_chart(&spec, &inputs(&records, &colors)).unwrap();
        let ChartOutcome::Ready(ChartSpec::Series { datasets, .. }) = outcome else {
            panic!("expected a series chart");
        };
        // Paired box + whiskers instead of one scatter series.
        assert_eq!(datasets.len(), 2);
        assert!(!datasets[0].in_legend);
        assert!(datasets[1].in_legend);
    }

    #[test]
    fn test_dataset_kind_serializes_in_renderer_vocabulary() {
        assert_eq!(
            serde_json::to_string(&DatasetKind::LineWithErrorBars).unwrap(),
            "\"lineWithErrorBars\""
        );
        assert_eq!(serde_json::to_string(&DatasetKind::Scatter).unwrap(), "\"scatter\"");
    }

    #[test]
    fn test_chart_point_omits_absent_optionals() {
        let point = ChartPoint {
            x: "2024-01-05".into(),
            y: 1.0,
            y_min: 1.0,
            y_max: 1.0,
            std: 0.0,
            stats: None,
            filter: None,
            sanity: None,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert!(json.get("stats").is_none());
        assert!(json.get("filter").is_none());
        assert_eq!(json["yMin"], 1.0);
    }
}
