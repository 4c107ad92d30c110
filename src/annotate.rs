//! Overlay annotations: instrument-log event lines, configured cutoff
//! thresholds, and year-boundary markers.
//!
//! The three families are independent pure functions of the plot spec, the
//! filtered records, the instrument log, and the threshold config — none of
//! those inputs is ever mutated. [`compose`] merges them in a fixed
//! precedence (instrument-log, then cutoff, then year-boundary): all
//! annotations are drawn, and a later family only replaces an earlier one on
//! a key collision, which the disjoint key namespaces prevent in practice.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::plot::PlotSpec;
use crate::record::{unit_number, CutoffConfig, DataType, InstrumentLog, QaRecord};

/// Annotation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationKind {
    /// Dashed vertical line at a calendar-year boundary.
    YearBoundary,
    /// Horizontal quality-threshold line.
    Cutoff,
    /// Vertical line at a hardware event date.
    InstrumentEvent,
}

/// Where an annotation line is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationPosition {
    /// Vertical line at a UTC day (instrument events).
    VerticalDay(NaiveDate),
    /// Vertical line at an exact instant (year boundaries).
    VerticalInstant(DateTime<Utc>),
    /// Horizontal line at a y value (cutoffs).
    Horizontal(f64),
}

/// Static line styling handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub width: u8,
    /// Dash pattern `(on, off)`; `None` draws solid.
    pub dash: Option<(u8, u8)>,
}

/// Static label content. Interactive reveal is a rendering-layer concern;
/// the core only says whether the label waits for hover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationLabel {
    pub lines: Vec<String>,
    /// When true the renderer shows the label on pointer hover only.
    pub on_hover: bool,
}

/// One overlay marker, rebuilt fresh per render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub key: String,
    pub kind: AnnotationKind,
    pub position: AnnotationPosition,
    pub style: LineStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<AnnotationLabel>,
}

/// Line color for an instrument-log part tag.
fn part_color(part: &str) -> &'static str {
    match part {
        "cam" => "#d62728",
        "fw" => "#ff7f0e",
        "mount" => "#2ca02c",
        "mirror" => "#9467bd",
        "motor" => "#8c564b",
        "focuser" => "#e377c2",
        "filt_config" => "#7f7f7f",
        _ => "#17becf",
    }
}

/// Instrument-log event lines.
///
/// Both the part selection and the unit selection must be non-empty, or no
/// annotations are produced: an empty units set deliberately suppresses all
/// instrument-log overlays (it does not mean "all units" here). An event
/// passes only when its unit matches a selected unit after numeric-suffix
/// normalization AND its part tag is selected.
pub fn inst_log_lines(spec: &PlotSpec, log: &InstrumentLog) -> Vec<Annotation> {
    if spec.inst_log_parts.is_empty() || spec.units.is_empty() || log.events.is_empty() {
        return Vec::new();
    }

    let selected_numbers: BTreeSet<String> = spec
        .units
        .iter()
        .filter_map(|u| unit_number(u))
        .collect();

    log.events
        .iter()
        .filter(|event| {
            let unit_matches = event
                .unit
                .as_deref()
                .and_then(unit_number)
                .is_some_and(|n| selected_numbers.contains(&n));
            let part_matches = event
                .parts
                .as_deref()
                .is_some_and(|p| spec.inst_log_parts.contains(p));
            unit_matches && part_matches
        })
        .enumerate()
        .filter_map(|(idx, event)| {
            let Some(day) = event.event_date() else {
                tracing::debug!(date = %event.date, "skipping instrument-log event with bad date");
                return None;
            };
            let part = event.parts.as_deref().unwrap_or("unknown");
            Some(Annotation {
                key: format!("instlog_{part}_{idx}"),
                kind: AnnotationKind::InstrumentEvent,
                position: AnnotationPosition::VerticalDay(day),
                style: LineStyle {
                    color: part_color(part).to_string(),
                    width: 1,
                    dash: None,
                },
                label: Some(AnnotationLabel {
                    lines: vec![
                        format!("Unit: {}", event.unit.as_deref().unwrap_or("N/A")),
                        event.comment.clone().unwrap_or_else(|| "N/A".into()),
                    ],
                    on_hover: true,
                }),
            })
        })
        .collect()
}

/// Configured cutoff threshold lines for the plot's parameter.
pub fn cutoff_lines(spec: &PlotSpec, config: &CutoffConfig) -> Vec<Annotation> {
    let param_upper = spec.parameter.to_uppercase();
    config
        .thresholds(spec.data_type, &spec.parameter)
        .into_iter()
        .enumerate()
        .map(|(idx, value)| Annotation {
            key: format!("cutoff_{param_upper}_{idx}"),
            kind: AnnotationKind::Cutoff,
            position: AnnotationPosition::Horizontal(value),
            style: LineStyle {
                color: "red".into(),
                width: 2,
                dash: Some((5, 5)),
            },
            label: None,
        })
        .collect()
}

/// Year-boundary lines for every calendar year present in the visible data
/// after the first chronological year. The first year gets no line.
pub fn year_lines(data_type: DataType, records: &[&QaRecord]) -> Vec<Annotation> {
    let years: BTreeSet<i32> = records
        .iter()
        .filter_map(|r| data_type.day_of(r))
        .map(|day| chrono::Datelike::year(&day))
        .collect();

    years
        .into_iter()
        .skip(1)
        .filter_map(|year| {
            let boundary = NaiveDate::from_ymd_opt(year, 1, 1)?
                .and_hms_opt(0, 0, 0)?
                .and_utc();
            Some(Annotation {
                key: format!("yearline{year}"),
                kind: AnnotationKind::YearBoundary,
                position: AnnotationPosition::VerticalInstant(boundary),
                style: LineStyle {
                    color: "rgba(0, 0, 0, 0.5)".into(),
                    width: 2,
                    dash: Some((6, 6)),
                },
                label: Some(AnnotationLabel {
                    lines: vec![year.to_string()],
                    on_hover: false,
                }),
            })
        })
        .collect()
}

/// Merge the three families in precedence order. Later families override
/// earlier ones on key collision but keep the earlier draw position.
pub fn compose(
    spec: &PlotSpec,
    filtered: &[&QaRecord],
    inst_log: Option<&InstrumentLog>,
    cutoffs: Option<&CutoffConfig>,
) -> Vec<Annotation> {
    let mut merged: Vec<Annotation> = Vec::new();
    let families = [
        inst_log.map(|log| inst_log_lines(spec, log)).unwrap_or_default(),
        cutoffs.map(|cfg| cutoff_lines(spec, cfg)).unwrap_or_default(),
        year_lines(spec.data_type, filtered),
    ];
    for annotation in families.into_iter().flatten() {
        match merged.iter_mut().find(|a| a.key == annotation.key) {
            Some(slot) => *slot = annotation,
            None => merged.push(annotation),
        }
    }
    merged
}
