use super::error::ReportError;
use super::stats::{mean, round2};
use super::PopulationRecord;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct RegionMean {
    pub region: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionRange {
    pub region: String,
    pub max: f64,
    pub min: f64,
}

/// Section 3: regional means (descending) and per-region extremes (by region name)
#[derive(Debug, Clone, PartialEq)]
pub struct RegionalAnalysis {
    pub means: Vec<RegionMean>,
    pub ranges: Vec<RegionRange>,
}

/// Groups on region only. A region whose populations are all missing gets NaN values
/// and sorts after every other mean.
pub fn regional_analysis(records: &[PopulationRecord]) -> Result<RegionalAnalysis, ReportError> {
    let mut by_region: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        let Some(region) = record.region.as_deref() else {
            continue;
        };
        by_region.entry(region).or_default().extend(record.population);
    }
    if by_region.is_empty() {
        return Err(ReportError::EmptyInput);
    }

    let mut means: Vec<RegionMean> = by_region
        .iter()
        .map(|(region, values)| RegionMean {
            region: region.to_string(),
            mean: mean(values),
        })
        .collect();
    // Stable: equal means keep region-name order
    means.sort_by(|a, b| match (a.mean.is_nan(), b.mean.is_nan()) {
        (false, false) => b.mean.total_cmp(&a.mean),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    });

    let ranges = by_region
        .iter()
        .map(|(region, values)| RegionRange {
            region: region.to_string(),
            max: round2(values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)),
            min: round2(values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)),
        })
        .collect();

    Ok(RegionalAnalysis { means, ranges })
}
