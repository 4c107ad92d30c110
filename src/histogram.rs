//! Histogram transformer: adaptive-width binning and distribution
//! statistics for a single parameter.

use crate::chart::Statistics;
use crate::params::{ParamInfo, ParamKind};
use crate::record::QaRecord;

/// Binned counts plus summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramResult {
    /// Range label per bin.
    pub labels: Vec<String>,
    /// Occupancy per bin; sums to the number of valid values.
    pub counts: Vec<u64>,
    /// Distribution statistics over the valid values.
    pub statistics: Statistics,
}

/// Bin a parameter's values across the filtered set.
///
/// Pre-aggregated records contribute their `median`; everything else
/// contributes the raw parameter value. Non-finite and missing values are
/// dropped. Returns `None` when no valid value remains.
pub fn transform(filtered: &[&QaRecord], param: &ParamInfo) -> Option<HistogramResult> {
    let values: Vec<f64> = filtered
        .iter()
        .filter_map(|r| {
            r.stats
                .as_ref()
                .and_then(|s| s.median)
                .filter(|v| v.is_finite())
                .or_else(|| r.parameter(param.name))
        })
        .collect();
    if values.is_empty() {
        return None;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bin_count = bin_count(values.len());
    let bin_width = (max - min) / bin_count as f64;

    // A degenerate range collapses to a single bin covering the point.
    let (bin_count, bin_width) = if bin_width > 0.0 {
        (bin_count, bin_width)
    } else {
        (1, 0.0)
    };

    let labels = (0..bin_count)
        .map(|i| {
            let lo = min + i as f64 * bin_width;
            let hi = min + (i + 1) as f64 * bin_width;
            match param.kind {
                ParamKind::Int => format!("{}-{}", lo.floor() as i64, hi.floor() as i64),
                ParamKind::Float => format!("{lo:.2}-{hi:.2}"),
            }
        })
        .collect();

    let mut counts = vec![0u64; bin_count];
    for &value in &values {
        let idx = if bin_width > 0.0 {
            (((value - min) / bin_width).floor() as usize).min(bin_count - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }

    Some(HistogramResult {
        labels,
        counts,
        statistics: statistics(&values),
    })
}

/// Square-root rule capped at 20 bins.
fn bin_count(n: usize) -> usize {
    ((n as f64).sqrt().ceil() as usize).clamp(1, 20)
}

/// Mean, population standard deviation, and quartiles.
///
/// Quartiles follow the index = n×p rule with adjacent-element averaging
/// when the index lands on an integer boundary: even counts interpolate
/// the median, counts divisible by four interpolate Q1/Q3.
fn statistics(values: &[f64]) -> Statistics {
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let quartile = |p: f64| {
        let idx = (n as f64 * p).floor() as usize;
        if n % 4 == 0 {
            (sorted[idx - 1] + sorted[idx]) / 2.0
        } else {
            sorted[idx]
        }
    };

    Statistics {
        mean,
        std: variance.sqrt(),
        median,
        q1: quartile(0.25),
        q3: quartile(0.75),
    }
}
