use crate::data::{ColumnType, Table};

/// Arithmetic mean, NaN when empty
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator), NaN with fewer than two values
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Quantile of ascending-sorted values by linear interpolation between closest ranks
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Round to two decimals, ties to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Per-column structure summary
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: ColumnType,
    pub non_null: usize,
    pub nulls: usize,
}

/// Descriptive statistics of one numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl Describe {
    pub fn from_values(column: &str, values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self {
            column: column.to_string(),
            count: sorted.len(),
            mean: mean(&sorted),
            std: sample_std(&sorted),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }

    /// Statistic labels paired with values, in display order
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

/// Section 1: table structure, missing values, duplicates and descriptive statistics
#[derive(Debug, Clone, PartialEq)]
pub struct BasicStats {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
    pub duplicate_rows: usize,
    pub describe: Vec<Describe>,
}

impl BasicStats {
    pub fn total_nulls(&self) -> usize {
        self.columns.iter().map(|c| c.nulls).sum()
    }
}

pub fn basic_stats(table: &Table) -> BasicStats {
    let columns = table
        .columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name.clone(),
            dtype: c.dtype,
            non_null: c.non_null_count(),
            nulls: c.null_count(),
        })
        .collect();

    let describe = table
        .columns()
        .iter()
        .filter(|c| c.dtype.is_numeric())
        .map(|c| Describe::from_values(&c.name, &c.numeric_values()))
        .collect();

    BasicStats {
        rows: table.row_count(),
        columns,
        duplicate_rows: table.duplicate_rows(),
        describe,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::read_csv;

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), 5.0);
        assert!((sample_std(&values) - 2.138089935299395).abs() < 1e-12);
        assert!(mean(&[]).is_nan());
        assert!(sample_std(&[1.0]).is_nan());
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 0.25), 1.75);
        assert_eq!(quantile(&sorted, 0.5), 2.5);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(-10.0), -10.0);
        assert_eq!(round2(0.125), 0.12);
    }

    #[test]
    fn test_basic_stats() {
        let csv = "region,year,population,note\nA,2020,100,x\nA,2021,150,\nA,2021,150,\nB,2020,200,y\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        let stats = basic_stats(&table);

        assert_eq!(stats.rows, 4);
        assert_eq!(stats.duplicate_rows, 1);
        assert_eq!(stats.total_nulls(), 2);

        let note = stats.columns.iter().find(|c| c.name == "note").unwrap();
        assert_eq!(note.nulls, 2);
        assert_eq!(note.dtype, ColumnType::Object);

        // Only numeric columns are described
        let described: Vec<&str> = stats.describe.iter().map(|d| d.column.as_str()).collect();
        assert_eq!(described, vec!["year", "population"]);

        let pop = &stats.describe[1];
        assert_eq!(pop.count, 4);
        assert_eq!(pop.mean, 150.0);
        assert_eq!(pop.min, 100.0);
        assert_eq!(pop.q50, 150.0);
        assert_eq!(pop.max, 200.0);
    }

    #[test]
    fn test_basic_stats_empty_table() {
        let table = read_csv("region,year,population\n".as_bytes()).unwrap();
        let stats = basic_stats(&table);
        assert_eq!(stats.rows, 0);
        assert_eq!(stats.duplicate_rows, 0);
        // Empty columns infer as float64, so each gets an all-NaN description
        assert_eq!(stats.describe.len(), 3);
        assert!(stats.describe.iter().all(|d| d.count == 0 && d.mean.is_nan()));
    }
}
