use super::error::ReportError;
use super::stats::{mean, round2, sample_std};
use super::PopulationRecord;
use std::collections::BTreeMap;

/// Total population of one year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearTotal {
    pub year: i64,
    pub total: f64,
}

/// Per-year summary over the present populations, rounded to two decimals. `std` is
/// `None` for years with fewer than two; a year with none has NaN mean, min and max.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearStats {
    pub year: i64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: Option<f64>,
}

/// Section 2: yearly totals for the trend line plus per-year statistics
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyTrend {
    pub totals: Vec<YearTotal>,
    pub stats: Vec<YearStats>,
}

impl YearlyTrend {
    /// (year, total) points for plotting
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.totals
            .iter()
            .map(|t| (t.year as f64, t.total))
            .collect()
    }
}

/// Groups on year only: rows missing a region still count, rows missing a year are dropped.
pub fn yearly_trend(records: &[PopulationRecord]) -> Result<YearlyTrend, ReportError> {
    let mut by_year: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for record in records {
        let Some(year) = record.year else {
            continue;
        };
        let values = by_year.entry(year).or_default();
        values.extend(record.population);
    }
    if by_year.is_empty() {
        return Err(ReportError::EmptyInput);
    }

    let totals = by_year
        .iter()
        .map(|(&year, values)| YearTotal {
            year,
            total: values.iter().sum(),
        })
        .collect();

    let stats = by_year
        .iter()
        .map(|(&year, values)| {
            let std = sample_std(values);
            YearStats {
                year,
                mean: round2(mean(values)),
                min: round2(extreme(values, f64::min)),
                max: round2(extreme(values, f64::max)),
                std: (!std.is_nan()).then(|| round2(std)),
            }
        })
        .collect();

    Ok(YearlyTrend { totals, stats })
}

/// Fold with `pick`, NaN for an empty slice
fn extreme(values: &[f64], pick: fn(f64, f64) -> f64) -> f64 {
    values.iter().copied().reduce(pick).unwrap_or(f64::NAN)
}
