//! Report sections computed from a loaded population table.
//!
//! Every section is a pure function of the table or of the records extracted
//! from it. Sections fail independently: a missing column or duplicate key is
//! reported on the affected section only.

mod change;
mod error;
mod pivot;
mod regional;
mod stats;
mod trend;

pub use change::{change_analysis, ChangeAnalysis, ChangeRate, ChangeRow};
pub use error::ReportError;
pub use pivot::{pivot_mean, pivot_unique, visualization, PivotMatrix, Visualization};
pub use regional::{regional_analysis, RegionMean, RegionRange, RegionalAnalysis};
pub use stats::{basic_stats, mean, quantile, round2, sample_std, BasicStats, ColumnInfo, Describe};
pub use trend::{yearly_trend, YearStats, YearTotal, YearlyTrend};

use crate::data::{Cell, Table};
use tracing::{debug, info, warn};

pub const REGION: &str = "region";
pub const YEAR: &str = "year";
pub const POPULATION: &str = "population";

/// Default size of the top-N change selections
pub const DEFAULT_TOP_N: usize = 10;

/// One row of the `region`, `year` and `population` columns. A `None` field is a
/// missing cell; each section drops only the rows missing a field it groups on.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRecord {
    pub region: Option<String>,
    pub year: Option<i64>,
    pub population: Option<f64>,
}

impl PopulationRecord {
    pub fn new(region: impl Into<String>, year: i64, population: f64) -> Self {
        Self {
            region: Some(region.into()),
            year: Some(year),
            population: Some(population),
        }
    }

    pub fn with_gaps(region: Option<&str>, year: Option<i64>, population: Option<f64>) -> Self {
        Self {
            region: region.map(str::to_string),
            year,
            population,
        }
    }

    /// (region, year) when both are present
    pub fn key(&self) -> Option<(&str, i64)> {
        Some((self.region.as_deref()?, self.year?))
    }

    pub fn is_complete(&self) -> bool {
        self.key().is_some() && self.population.is_some()
    }
}

/// Tunables for report sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub top_n: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Extract records from the `region`, `year` and `population` columns.
/// Missing cells are kept as `None`; present cells must parse.
pub fn extract_records(table: &Table) -> Result<Vec<PopulationRecord>, ReportError> {
    let missing: Vec<String> = [REGION, YEAR, POPULATION]
        .into_iter()
        .filter(|name| table.column(name).is_none())
        .map(str::to_string)
        .collect();

    let (Some(region), Some(year), Some(population)) = (
        table.column(REGION),
        table.column(YEAR),
        table.column(POPULATION),
    ) else {
        return Err(ReportError::Schema { missing });
    };

    let mut records = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let (r, y, p) = (&region.cells[row], &year.cells[row], &population.cells[row]);
        let year = match y {
            Cell::Null => None,
            cell => Some(parse_year(cell).ok_or_else(|| invalid(YEAR, row, cell))?),
        };
        let population = match p {
            Cell::Null => None,
            cell => Some(
                cell.as_f64()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| invalid(POPULATION, row, cell))?,
            ),
        };
        records.push(PopulationRecord {
            region: (!r.is_null()).then(|| r.to_string()),
            year,
            population,
        });
    }

    let incomplete = records.iter().filter(|r| !r.is_complete()).count();
    if incomplete > 0 {
        warn!(incomplete, "rows with missing region/year/population");
    }
    debug!(records = records.len(), "extracted population records");
    Ok(records)
}

/// Integer-like year: `2020`, `2020.0` or text of either
fn parse_year(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Int(v) => Some(*v),
        Cell::Text(s) if s.parse::<i64>().is_ok() => s.parse().ok(),
        _ => cell
            .as_f64()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64),
    }
}

fn invalid(column: &str, row: usize, cell: &Cell) -> ReportError {
    ReportError::InvalidValue {
        column: column.to_string(),
        row: row + 1,
        value: cell.to_string(),
    }
}

/// All five sections of a report
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub basic: BasicStats,
    pub trend: Result<YearlyTrend, ReportError>,
    pub regional: Result<RegionalAnalysis, ReportError>,
    pub changes: Result<ChangeAnalysis, ReportError>,
    pub visualization: Result<Visualization, ReportError>,
}

impl Report {
    /// Number of sections that failed
    pub fn failed_sections(&self) -> usize {
        [
            self.trend.is_err(),
            self.regional.is_err(),
            self.changes.is_err(),
            self.visualization.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

/// Computes report sections over one table
pub struct ReportBuilder<'a> {
    table: &'a Table,
    records: Result<Vec<PopulationRecord>, ReportError>,
    options: ReportOptions,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(table: &'a Table, options: ReportOptions) -> Self {
        Self {
            table,
            records: extract_records(table),
            options,
        }
    }

    /// Records shared by sections 2-5, or the extraction error for each of them
    pub fn records(&self) -> Result<&[PopulationRecord], ReportError> {
        self.records.as_deref().map_err(ReportError::clone)
    }

    pub fn basic_stats(&self) -> BasicStats {
        basic_stats(self.table)
    }

    pub fn yearly_trend(&self) -> Result<YearlyTrend, ReportError> {
        yearly_trend(self.records()?)
    }

    pub fn regional_analysis(&self) -> Result<RegionalAnalysis, ReportError> {
        regional_analysis(self.records()?)
    }

    pub fn change_analysis(&self) -> Result<ChangeAnalysis, ReportError> {
        change_analysis(self.records()?, self.options.top_n)
    }

    pub fn visualization(&self) -> Result<Visualization, ReportError> {
        visualization(self.records()?)
    }

    pub fn build(&self) -> Report {
        let report = Report {
            basic: self.basic_stats(),
            trend: self.yearly_trend(),
            regional: self.regional_analysis(),
            changes: self.change_analysis(),
            visualization: self.visualization(),
        };
        for (section, result) in [
            ("yearly trend", report.trend.as_ref().err()),
            ("regional analysis", report.regional.as_ref().err()),
            ("change analysis", report.changes.as_ref().err()),
            ("visualization", report.visualization.as_ref().err()),
        ] {
            if let Some(err) = result {
                warn!(section, error = %err, "report section failed");
            }
        }
        debug!(
            years = report.trend.as_ref().map_or(0, |t| t.totals.len()),
            regions = report.regional.as_ref().map_or(0, |r| r.means.len()),
            top_changes = report.changes.as_ref().map_or(0, |c| c.top_changes.len()),
            area_ok = report.visualization.as_ref().is_ok_and(|v| v.area.is_ok()),
            "section sizes"
        );
        info!(
            rows = report.basic.rows,
            failed = report.failed_sections(),
            "report built"
        );
        report
    }
}
