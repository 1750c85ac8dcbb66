use super::error::ReportError;
use super::PopulationRecord;
use std::collections::BTreeSet;

/// Year x region matrix of population. Rows are years, columns regions, both ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotMatrix {
    years: Vec<i64>,
    regions: Vec<String>,
    cells: Vec<Vec<Option<f64>>>,
}

impl PivotMatrix {
    /// Empty matrix spanning every (year, region) key present in `records`
    fn empty_for(records: &[PopulationRecord]) -> Self {
        let keys: Vec<(&str, i64)> = records.iter().filter_map(PopulationRecord::key).collect();
        let years: Vec<i64> = keys
            .iter()
            .map(|&(_, year)| year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let regions: Vec<String> = keys
            .iter()
            .map(|&(region, _)| region)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let cells = vec![vec![None; regions.len()]; years.len()];
        Self {
            years,
            regions,
            cells,
        }
    }

    /// Row and column index of a key; every key exists by construction
    fn index_of(&self, (region, year): (&str, i64)) -> (usize, usize) {
        let y = self.years.binary_search(&year).unwrap_or_default();
        let r = self
            .regions
            .binary_search_by(|probe| probe.as_str().cmp(region))
            .unwrap_or_default();
        (y, r)
    }

    pub fn years(&self) -> &[i64] {
        &self.years
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.cells
    }

    pub fn value(&self, year_idx: usize, region_idx: usize) -> Option<f64> {
        self.cells.get(year_idx)?.get(region_idx).copied().flatten()
    }

    /// Sum of every present cell
    pub fn total(&self) -> f64 {
        self.cells.iter().flatten().flatten().sum()
    }

    /// Cumulative series per region for a stacked area chart: `stacked[r][y]` is the
    /// sum of regions `0..=r` in year `y`, with empty cells counted as zero.
    pub fn stacked(&self) -> Vec<Vec<f64>> {
        let mut layers = Vec::with_capacity(self.regions.len());
        let mut running = vec![0.0; self.years.len()];
        for r in 0..self.regions.len() {
            for (y, sum) in running.iter_mut().enumerate() {
                *sum += self.cells[y][r].unwrap_or(0.0);
            }
            layers.push(running.clone());
        }
        layers
    }
}

/// Reshape with exactly one record per (year, region) key; a repeated key is an error
/// even when a population is missing. Rows missing a region or year are dropped.
pub fn pivot_unique(records: &[PopulationRecord]) -> Result<PivotMatrix, ReportError> {
    let mut matrix = PivotMatrix::empty_for(records);
    let mut taken = vec![vec![false; matrix.regions.len()]; matrix.years.len()];
    for record in records {
        let Some(key) = record.key() else {
            continue;
        };
        let (y, r) = matrix.index_of(key);
        if taken[y][r] {
            return Err(ReportError::Ambiguity {
                year: key.1,
                region: key.0.to_string(),
            });
        }
        taken[y][r] = true;
        matrix.cells[y][r] = record.population;
    }
    Ok(matrix)
}

/// Reshape averaging the present populations that share a (year, region) key
pub fn pivot_mean(records: &[PopulationRecord]) -> PivotMatrix {
    let mut matrix = PivotMatrix::empty_for(records);
    let mut counts = vec![vec![0usize; matrix.regions.len()]; matrix.years.len()];
    let mut sums = vec![vec![0.0f64; matrix.regions.len()]; matrix.years.len()];
    for record in records {
        let (Some(key), Some(population)) = (record.key(), record.population) else {
            continue;
        };
        let (y, r) = matrix.index_of(key);
        counts[y][r] += 1;
        sums[y][r] += population;
    }
    for (y, row) in matrix.cells.iter_mut().enumerate() {
        for (r, cell) in row.iter_mut().enumerate() {
            if counts[y][r] > 0 {
                *cell = Some(sums[y][r] / counts[y][r] as f64);
            }
        }
    }
    matrix
}

/// Section 5: matrix for the stacked area chart and mean-aggregated matrix for the heatmap.
/// Duplicate keys only fail the area matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Visualization {
    pub area: Result<PivotMatrix, ReportError>,
    pub heatmap: PivotMatrix,
}

pub fn visualization(records: &[PopulationRecord]) -> Result<Visualization, ReportError> {
    if records.iter().all(|r| r.key().is_none()) {
        return Err(ReportError::EmptyInput);
    }
    Ok(Visualization {
        area: pivot_unique(records),
        heatmap: pivot_mean(records),
    })
}
