//! `qa_charts`
//!
//! Aggregation and transformation engine that turns telescope-pipeline QA
//! measurements into chart-ready series: selection filtering, series
//! grouping with stable colors, time-series / histogram / box-summary
//! transformers, and overlay annotation composition.
//!
//! ## Pipeline
//!
//! Records arrive as snapshots in a [`store::RecordStore`], keyed by a
//! [`plot::SnapshotKey`]. A [`plot::PlotSpec`] carries the user's selection
//! state; [`chart::build_chart`] recomputes the full chart from scratch on
//! every call:
//!
//! 1. validate the parameter against the data type's vocabulary ([`params`])
//! 2. filter the snapshot by the selections ([`filter`])
//! 3. group into series with stable colors ([`group`])
//! 4. transform per chart type ([`timeseries`], [`histogram`],
//!    [`boxsummary`])
//! 5. compose overlay annotations ([`annotate`])
//!
//! ## Key Types
//!
//! - [`record::QaRecord`]: one QA measurement row as fetched
//! - [`plot::PlotSpec`]: per-panel selection state
//! - [`chart::ChartOutcome`]: a renderable chart or a typed empty cause
//! - [`group::UnitColorMap`]: the stable unit-to-color assignment
//!
//! Empty results are outcomes, not errors: the only hard failure a caller
//! sees from a well-formed snapshot is an unknown parameter name.

pub mod annotate;
pub mod boxsummary;
pub mod chart;
pub mod error;
pub mod export;
pub mod filter;
pub mod group;
pub mod histogram;
pub mod params;
pub mod plot;
pub mod record;
pub mod store;
pub mod timeseries;

pub use chart::{build_chart, ChartInputs, ChartOutcome, ChartSpec, EmptyCause};
pub use error::{QaError, Result};
pub use group::UnitColorMap;
pub use plot::{ChartType, PlotSpec, SnapshotKey};
pub use record::{CutoffConfig, DataType, InstrumentLog, QaRecord};
pub use store::RecordStore;
