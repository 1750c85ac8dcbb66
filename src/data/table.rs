use std::collections::HashSet;
use std::fmt;

/// Cell values treated as missing, matched after trimming whitespace
const NULL_MARKERS: [&str; 13] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Returns `None` for missing values, otherwise the trimmed cell text
pub fn normalize_cell(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if NULL_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

/// Inferred storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int64,
    Float64,
    Object,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Int64 | ColumnType::Float64)
    }

    pub fn label(self) -> &'static str {
        match self {
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Object => "object",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single parsed cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

/// Hashable form of a cell for duplicate detection (floats by bit pattern)
#[derive(Hash, PartialEq, Eq)]
enum CellKey<'a> {
    Null,
    Int(i64),
    Float(u64),
    Text(&'a str),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric value of the cell; text is parsed leniently
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Null => None,
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Text(s) => s.parse().ok(),
        }
    }

    fn key(&self) -> CellKey<'_> {
        match self {
            Cell::Null => CellKey::Null,
            Cell::Int(v) => CellKey::Int(*v),
            // -0.0 and 0.0 are the same value
            Cell::Float(v) if *v == 0.0 => CellKey::Float(0),
            Cell::Float(v) => CellKey::Float(v.to_bits()),
            Cell::Text(s) => CellKey::Text(s),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NaN"),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// A named, typed column of cells
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub cells: Vec<Cell>,
}

impl Column {
    /// Build a column from raw text, inferring its type from the non-null values.
    /// An all-null column is `Float64`.
    pub fn from_raw(name: impl Into<String>, raw: &[Option<String>]) -> Self {
        let present = || raw.iter().flatten();

        let dtype = if present().all(|s| s.parse::<i64>().is_ok()) {
            ColumnType::Int64
        } else if present().all(|s| s.parse::<f64>().is_ok()) {
            ColumnType::Float64
        } else {
            ColumnType::Object
        };
        // Vacuous truth above types an empty column as Int64
        let dtype = if present().next().is_none() {
            ColumnType::Float64
        } else {
            dtype
        };

        let cells = raw
            .iter()
            .map(|value| match value {
                None => Cell::Null,
                Some(s) => match dtype {
                    ColumnType::Int64 => s.parse().map(Cell::Int).unwrap_or(Cell::Null),
                    ColumnType::Float64 => s.parse().map(Cell::Float).unwrap_or(Cell::Null),
                    ColumnType::Object => Cell::Text(s.clone()),
                },
            })
            .collect();

        Self {
            name: name.into(),
            dtype,
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_null()).count()
    }

    pub fn non_null_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Non-null numeric values in row order (empty for object columns)
    pub fn numeric_values(&self) -> Vec<f64> {
        if !self.dtype.is_numeric() {
            return Vec::new();
        }
        self.cells.iter().filter_map(Cell::as_f64).collect()
    }
}

/// An in-memory CSV table stored column-wise
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// All columns must have the same length
    pub fn new(columns: Vec<Column>) -> Self {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        debug_assert!(columns.iter().all(|c| c.len() == rows));
        Self { columns, rows }
    }

    /// Build from header names and row-major raw cells (already null-normalized)
    pub fn from_rows(headers: Vec<String>, rows: &[Vec<Option<String>>]) -> Self {
        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let raw: Vec<Option<String>> = rows
                    .iter()
                    .map(|row| row.get(idx).cloned().flatten())
                    .collect();
                Column::from_raw(name, &raw)
            })
            .collect();
        let mut table = Self::new(columns);
        // Header-only input still has zero rows, but a table without columns keeps its row count
        if table.columns.is_empty() {
            table.rows = rows.len();
        }
        table
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows equal to some earlier row across every column
    pub fn duplicate_rows(&self) -> usize {
        let mut seen = HashSet::with_capacity(self.rows);
        (0..self.rows)
            .filter(|&row| {
                let key: Vec<CellKey<'_>> = self.columns.iter().map(|c| c.cells[row].key()).collect();
                !seen.insert(key)
            })
            .count()
    }
}
