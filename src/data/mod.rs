mod table;

pub use table::{normalize_cell, Cell, Column, ColumnType, Table};

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Load a CSV file with a header row into a typed table
pub fn load_csv(path: &Path) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let table = read_csv(BufReader::new(file))
        .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded csv"
    );
    Ok(table)
}

/// Parse CSV from any reader. Short rows are padded with nulls, long rows truncated.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = unique_headers(rdr.headers()?.iter());
    let width = headers.len();

    let mut rows = Vec::new();
    let mut truncated = 0usize;
    for result in rdr.records() {
        let record = result?;
        if record.len() > width {
            truncated += 1;
        }
        let row: Vec<Option<String>> = record
            .iter()
            .take(width)
            .map(|field| normalize_cell(field).map(str::to_string))
            .collect();
        rows.push(row);
    }

    if truncated > 0 {
        warn!(rows = truncated, width, "rows wider than the header were truncated");
    }
    debug!(rows = rows.len(), "read csv records");

    Ok(Table::from_rows(headers, &rows))
}

/// Trim header names, name blank ones `Unnamed: N` and suffix repeats with `.1`, `.2`, ...
fn unique_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.enumerate()
        .map(|(idx, name)| {
            let name = match name.trim() {
                "" => format!("Unnamed: {idx}"),
                trimmed => trimmed.to_string(),
            };
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name
            } else {
                format!("{name}.{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}
