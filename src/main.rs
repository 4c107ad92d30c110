//! CLI entry point for qa-charts.
//!
//! One-shot chart computation over JSON record dumps:
//! - `chart` renders a plot spec to chart-ready JSON
//! - `export` writes the same selection as CSV
//!
//! # Usage
//!
//! ```bash
//! qa-charts chart --records records.json --data-type bias --parameter clipmed
//! qa-charts export --records records.json --data-type science \
//!     --parameter seeing --unit 7DT01 --output seeing.csv
//! ```

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use qa_charts::params::PipelineVersion;
use qa_charts::{
    build_chart, ChartInputs, ChartType, CutoffConfig, DataType, InstrumentLog, PlotSpec,
    QaRecord, RecordStore, SnapshotKey,
};

#[derive(Parser)]
#[command(name = "qa-charts")]
#[command(about = "Turn telescope QA records into chart-ready series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a chart and print it as JSON
    Chart {
        #[command(flatten)]
        selection: Selection,

        /// Visual encoding
        #[arg(long, value_enum, default_value_t = ChartType::Line)]
        chart_type: ChartType,

        /// Instrument-log JSON file for event overlays
        #[arg(long)]
        inst_log: Option<PathBuf>,

        /// Cutoff threshold config JSON file
        #[arg(long)]
        qa_config: Option<PathBuf>,

        /// Instrument-log part tags to overlay (repeatable)
        #[arg(long = "part")]
        inst_log_parts: Vec<String>,

        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export the selected records as CSV
    Export {
        #[command(flatten)]
        selection: Selection,

        /// Write CSV here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Selection flags shared by both subcommands.
#[derive(Args)]
struct Selection {
    /// JSON file holding the fetched QA records
    #[arg(long)]
    records: PathBuf,

    /// Data type to plot
    #[arg(long, value_enum)]
    data_type: DataType,

    /// Parameter wire name
    #[arg(long)]
    parameter: String,

    /// Restrict to these units (repeatable; none = all)
    #[arg(long = "unit")]
    units: Vec<String>,

    /// Restrict to these optical filters (repeatable)
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// Restrict to these target objects (repeatable)
    #[arg(long = "object")]
    objects: Vec<String>,

    /// Inclusive lower date bound (YYYY-MM-DD, UTC)
    #[arg(long)]
    date_min: Option<NaiveDate>,

    /// Inclusive upper date bound (YYYY-MM-DD, UTC)
    #[arg(long)]
    date_max: Option<NaiveDate>,

    /// Pipeline generation
    #[arg(long, value_enum, default_value_t = PipelineVersion::V1)]
    version: PipelineVersion,
}

impl Selection {
    fn plot_spec(&self) -> PlotSpec {
        let mut spec = PlotSpec::new(self.data_type, self.parameter.clone());
        spec.units = self.units.iter().cloned().collect();
        spec.filters = self.filters.iter().cloned().collect();
        spec.objects = self.objects.iter().cloned().collect();
        spec.date_min = self.date_min;
        spec.date_max = self.date_max;
        spec.version = self.version;
        spec
    }

    fn load_records(&self) -> Result<Vec<QaRecord>> {
        load_json(&self.records).context("reading records file")
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(serde_json::from_reader(io::BufReader::new(file))?)
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            Ok(Box::new(io::BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Chart {
            selection,
            chart_type,
            inst_log,
            qa_config,
            inst_log_parts,
            output,
        } => {
            let mut spec = selection.plot_spec();
            spec.chart_type = chart_type;
            spec.inst_log_parts = inst_log_parts.into_iter().collect();

            let inst_log: Option<InstrumentLog> = inst_log
                .as_ref()
                .map(load_json)
                .transpose()
                .context("reading instrument log")?;
            let cutoffs: Option<CutoffConfig> = qa_config
                .as_ref()
                .map(load_json)
                .transpose()
                .context("reading cutoff config")?;

            // Feed the one-shot snapshot through the store so colors come
            // from the same unit universe a long-lived caller would have.
            let mut store = RecordStore::new();
            let key = SnapshotKey::of(&spec);
            store.replace(key.clone(), selection.load_records()?);
            let snapshot = store
                .snapshot(&key)
                .context("snapshot missing after replace")?;
            let colors = store.color_map();

            let outcome = build_chart(
                &spec,
                &ChartInputs {
                    records: &snapshot,
                    colors: &colors,
                    inst_log: inst_log.as_ref(),
                    cutoffs: cutoffs.as_ref(),
                },
            )?;

            let mut out = open_output(output.as_ref())?;
            serde_json::to_writer_pretty(&mut out, &outcome)?;
            writeln!(out)?;
            Ok(())
        }
        Commands::Export { selection, output } => {
            let spec = selection.plot_spec();
            let records = selection.load_records()?;
            let out = open_output(output.as_ref())?;
            qa_charts::export::write_csv(&spec, &records, out)?;
            Ok(())
        }
    }
}
