use super::error::ReportError;
use super::stats::round2;
use super::PopulationRecord;
use std::fmt;

/// Year-over-year percentage change of a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChangeRate {
    /// No previous-year population to compare against, or this year's is missing
    Missing,
    /// Previous population was zero
    NotApplicable,
    /// Percentage rounded to two decimals
    Percent(f64),
}

impl ChangeRate {
    pub fn percent(self) -> Option<f64> {
        match self {
            ChangeRate::Percent(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeRate::Missing => f.write_str("-"),
            ChangeRate::NotApplicable => f.write_str("n/a"),
            ChangeRate::Percent(p) => write!(f, "{p:+.2}%"),
        }
    }
}

/// A record with its change relative to the previous row of the same region
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRow {
    pub region: String,
    pub year: i64,
    pub population: Option<f64>,
    pub change: Option<f64>,
    pub rate: ChangeRate,
}

/// Section 4: full change table sorted by (region, year) and the top-N selections
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeAnalysis {
    pub rows: Vec<ChangeRow>,
    pub top_changes: Vec<ChangeRow>,
    pub top_rates: Vec<ChangeRow>,
}

/// Rows missing a region or year are dropped. Rows missing a population stay in the
/// table as gaps: neither they nor the row after them get a change.
pub fn change_analysis(
    records: &[PopulationRecord],
    top_n: usize,
) -> Result<ChangeAnalysis, ReportError> {
    let mut sorted: Vec<(&str, i64, Option<f64>)> = records
        .iter()
        .filter_map(|r| r.key().map(|(region, year)| (region, year, r.population)))
        .collect();
    if sorted.is_empty() {
        return Err(ReportError::EmptyInput);
    }
    // Stable, so duplicate (region, year) pairs keep input order
    sorted.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)));

    let mut rows: Vec<ChangeRow> = Vec::with_capacity(sorted.len());
    for (region, year, population) in sorted {
        let previous = rows
            .last()
            .filter(|p| p.region == region)
            .and_then(|p| p.population);
        let (change, rate) = match (previous, population) {
            (Some(prev), Some(current)) => {
                let change = current - prev;
                let rate = if prev == 0.0 {
                    ChangeRate::NotApplicable
                } else {
                    ChangeRate::Percent(round2(change / prev * 100.0))
                };
                (Some(change), rate)
            }
            _ => (None, ChangeRate::Missing),
        };
        rows.push(ChangeRow {
            region: region.to_string(),
            year,
            population,
            change,
            rate,
        });
    }

    let top_changes = top_by(&rows, top_n, |row| row.change);
    let top_rates = top_by(&rows, top_n, |row| row.rate.percent());

    Ok(ChangeAnalysis {
        rows,
        top_changes,
        top_rates,
    })
}

/// The `n` rows with the largest key, skipping rows without one. Ties keep table order.
fn top_by<F>(rows: &[ChangeRow], n: usize, key: F) -> Vec<ChangeRow>
where
    F: Fn(&ChangeRow) -> Option<f64>,
{
    let mut keyed: Vec<(f64, &ChangeRow)> = rows
        .iter()
        .filter_map(|row| key(row).map(|k| (k, row)))
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.into_iter().take(n).map(|(_, row)| row.clone()).collect()
}
