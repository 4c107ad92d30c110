//! CSV export of the filtered record set behind a plot.
//!
//! The export reflects what the chart shows: the same selection filter, the
//! same date semantics. Column layout adapts to the data type — quartile
//! columns appear only when at least one record carries complete statistics,
//! FILTER only for filtered frame types, OBJECT only for science.

use std::io::Write;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::filter;
use crate::params;
use crate::plot::PlotSpec;
use crate::record::{DataType, QaRecord};

/// Write the records a plot spec selects as CSV.
///
/// Rows are sorted by date ascending; records lacking the data-type-specific
/// date are excluded, consistent with the chart itself. The parameter name
/// is validated against the vocabulary first.
pub fn write_csv<W: Write>(spec: &PlotSpec, records: &[QaRecord], out: W) -> Result<()> {
    let param = params::validate(spec.data_type, spec.version, &spec.parameter)?;

    let mut dated: Vec<(DateTime<Utc>, &QaRecord)> = filter::apply(records, spec)
        .into_iter()
        .filter_map(|r| spec.data_type.date_of(r).map(|d| (d, r)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    let with_stats = dated.iter().any(|(_, r)| r.five_number().is_some());
    let with_filter = spec.data_type.uses_filters();
    let with_object = spec.data_type == DataType::Science;

    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["DATE-OBS".to_string(), "UNIT".into(), param.label.into()];
    if with_stats {
        header.extend(["MIN".into(), "Q1".into(), "MEDIAN".into(), "Q3".into(), "MAX".into()]);
    }
    if with_filter {
        header.push("FILTER".into());
    }
    if with_object {
        header.push("OBJECT".into());
    }
    writer.write_record(&header)?;

    for (date, record) in dated {
        let mut row = vec![
            spec.data_type.format_chart_date(date),
            record.unit.clone().unwrap_or_default(),
            record
                .parameters
                .get(param.name)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ];
        if with_stats {
            match record.five_number() {
                Some(stats) => row.extend([
                    stats.min.to_string(),
                    stats.q1.to_string(),
                    stats.median.to_string(),
                    stats.q3.to_string(),
                    stats.max.to_string(),
                ]),
                None => row.extend((0..5).map(|_| String::new())),
            }
        }
        if with_filter {
            row.push(record.filter.clone().unwrap_or_default());
        }
        if with_object {
            row.push(record.object.clone().unwrap_or_default());
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
