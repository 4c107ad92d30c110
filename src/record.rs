//! QA record data model and external input payloads.
//!
//! A [`QaRecord`] is one quality-assurance measurement tied to a single
//! calibration frame or science exposure, supplied by the external fetch
//! layer as JSON. This module also carries the other two fetch-layer
//! payloads the engine consumes read-only: the instrument log and the QA
//! threshold configuration.
//!
//! Which timestamp field is authoritative depends on the data type: science
//! exposures are placed by observation time (`date_obs`), calibration frames
//! by pipeline run date (`run_date`). That choice is a tagged dispatch on
//! [`DataType`], never a dynamic field lookup.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind of frame a QA record was measured on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Zero-exposure calibration frame.
    Bias,
    /// Dark-current calibration frame.
    Dark,
    /// Flat-field calibration frame.
    Flat,
    /// Science exposure.
    Science,
}

impl DataType {
    /// Lowercase wire name, as used by the fetch layer.
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Bias => "bias",
            DataType::Dark => "dark",
            DataType::Flat => "flat",
            DataType::Science => "science",
        }
    }

    /// Optical-filter selections apply only to flats and science exposures.
    pub fn uses_filters(self) -> bool {
        matches!(self, DataType::Flat | DataType::Science)
    }

    /// Target-object selections apply only to science exposures.
    pub fn uses_objects(self) -> bool {
        matches!(self, DataType::Science)
    }

    /// Select the authoritative timestamp for a record of this data type.
    pub fn date_of(self, record: &QaRecord) -> Option<DateTime<Utc>> {
        match self {
            DataType::Science => record.date_obs,
            _ => record.run_date,
        }
    }

    /// The authoritative timestamp truncated to a UTC day boundary.
    pub fn day_of(self, record: &QaRecord) -> Option<NaiveDate> {
        self.date_of(record).map(|d| d.date_naive())
    }

    /// Format a timestamp the way the renderer expects on the x axis:
    /// full instant for science exposures, day only for calibration frames.
    pub fn format_chart_date(self, date: DateTime<Utc>) -> String {
        match self {
            DataType::Science => date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            _ => date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precomputed quartile statistics carried by pre-aggregated records.
///
/// Every field is individually optional on the wire; a record only enters
/// box-summary mode when `min`, `q1`, `q3`, and `max` are all present
/// (see [`BoxStats::complete`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub q1: Option<f64>,
    #[serde(default)]
    pub median: Option<f64>,
    #[serde(default)]
    pub q3: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl BoxStats {
    /// Resolve into a full five-number summary, or `None` if any of the four
    /// required quantiles is missing. A missing median falls back to the
    /// interquartile midpoint.
    pub fn complete(&self) -> Option<FiveNumber> {
        let (min, q1, q3, max) = (self.min?, self.q1?, self.q3?, self.max?);
        Some(FiveNumber {
            min,
            q1,
            median: self.median.unwrap_or((q1 + q3) / 2.0),
            q3,
            max,
        })
    }
}

/// A resolved five-number summary (no missing fields).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveNumber {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// One QA measurement, immutable and externally supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaRecord {
    /// Which frame kind this record was measured on.
    pub qa_type: DataType,
    /// Telescope unit identifier (e.g. `"7DT01"`), absent for some sources.
    #[serde(default)]
    pub unit: Option<String>,
    /// Optical filter name, meaningful for flats and science exposures.
    #[serde(default)]
    pub filter: Option<String>,
    /// Target name, science exposures only.
    #[serde(default)]
    pub object: Option<String>,
    /// Observation timestamp (authoritative for science records).
    #[serde(default)]
    pub date_obs: Option<DateTime<Utc>>,
    /// Pipeline run date (authoritative for calibration records).
    #[serde(default)]
    pub run_date: Option<DateTime<Utc>>,
    /// Parameter name to measured value.
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    /// Quartile statistics, present only on pre-aggregated records.
    #[serde(default)]
    pub stats: Option<BoxStats>,
    /// Quality flag; `Some(false)` marks a failed sanity check.
    #[serde(default)]
    pub sanity: Option<bool>,
}

impl QaRecord {
    /// Finite value of a parameter, or `None` when absent or non-finite.
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied().filter(|v| v.is_finite())
    }

    /// Full five-number summary, when the record is pre-aggregated.
    pub fn five_number(&self) -> Option<FiveNumber> {
        self.stats.as_ref().and_then(BoxStats::complete)
    }
}

/// Instrument-log payload: hardware events usable as chart overlays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstrumentLog {
    #[serde(default)]
    pub events: Vec<InstLogEvent>,
}

/// One hardware event from the instrument log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstLogEvent {
    /// Event date in compact `YYMMDD` form.
    pub date: String,
    /// Unit the event applies to (free-form, e.g. `"7DT05"` or `"7DT5"`).
    #[serde(default)]
    pub unit: Option<String>,
    /// Hardware part tag (`cam`, `fw`, `mount`, ...).
    #[serde(default)]
    pub parts: Option<String>,
    /// Operator comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl InstLogEvent {
    /// Parse the compact `YYMMDD` date (years 2000-2099).
    pub fn event_date(&self) -> Option<NaiveDate> {
        if self.date.len() != 6 || !self.date.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(&format!("20{}", self.date), "%Y%m%d").ok()
    }
}

/// QA threshold configuration, keyed by uppercased data type then
/// uppercased parameter name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CutoffConfig(pub BTreeMap<String, BTreeMap<String, CutoffEntry>>);

/// One configured threshold entry. `value` may be a number, an array of
/// numbers, or a non-numeric "disabled" marker that yields no thresholds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CutoffEntry {
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl CutoffEntry {
    /// Numeric thresholds configured on this entry, in declaration order.
    /// Non-numeric values (e.g. a boolean disable flag) are skipped.
    pub fn thresholds(&self) -> Vec<f64> {
        fn as_number(v: &serde_json::Value) -> Option<f64> {
            v.as_f64().filter(|n| n.is_finite())
        }
        match &self.value {
            Some(serde_json::Value::Array(values)) => {
                values.iter().filter_map(as_number).collect()
            }
            Some(v) => as_number(v).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

impl CutoffConfig {
    /// Look up the thresholds configured for a data type / parameter pair.
    pub fn thresholds(&self, data_type: DataType, parameter: &str) -> Vec<f64> {
        self.0
            .get(&data_type.as_str().to_uppercase())
            .and_then(|params| params.get(&parameter.to_uppercase()))
            .map(CutoffEntry::thresholds)
            .unwrap_or_default()
    }
}

#[allow(clippy::expect_used)] // hardcoded patterns
static TRAILING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)$").expect("valid pattern"));
#[allow(clippy::expect_used)] // hardcoded patterns
static ANY_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid pattern"));

/// Extract the normalized unit number from a unit string, so differently
/// padded spellings compare equal: `"7DT05"` and `"7DT5"` both yield `"5"`.
///
/// Prefers a trailing digit run, then any digit run, with leading zeros
/// stripped. Returns `None` for strings with no digits.
pub fn unit_number(unit: &str) -> Option<String> {
    let digits = match TRAILING_NUMBER.captures(unit).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => ANY_NUMBER.find(unit)?.as_str(),
    };
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
}
