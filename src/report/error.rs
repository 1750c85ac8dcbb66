use std::fmt;

/// Errors raised by report sections. Each section fails independently.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    /// Required columns are absent from the table
    Schema { missing: Vec<String> },

    /// A (year, region) pair occurs more than once, so the matrix cell is ambiguous
    Ambiguity { year: i64, region: String },

    /// No records to compute over
    EmptyInput,

    /// A required cell cannot be read as its column's type. `row` is 1-based, header excluded.
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Schema { missing } => {
                write!(f, "Schema error: missing column(s): {}", missing.join(", "))
            }
            ReportError::Ambiguity { year, region } => write!(
                f,
                "Ambiguity error: duplicate entry for year {year}, region {region:?}"
            ),
            ReportError::EmptyInput => write!(f, "Empty input: no records to analyse"),
            ReportError::InvalidValue { column, row, value } => {
                write!(f, "Invalid value in column {column:?} at row {row}: {value:?}")
            }
        }
    }
}

impl std::error::Error for ReportError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let schema = ReportError::Schema {
            missing: vec!["year".to_string(), "population".to_string()],
        };
        assert_eq!(
            schema.to_string(),
            "Schema error: missing column(s): year, population"
        );

        let ambiguity = ReportError::Ambiguity {
            year: 2020,
            region: "Seoul".to_string(),
        };
        assert_eq!(
            ambiguity.to_string(),
            "Ambiguity error: duplicate entry for year 2020, region \"Seoul\""
        );

        let invalid = ReportError::InvalidValue {
            column: "year".to_string(),
            row: 3,
            value: "20x0".to_string(),
        };
        assert_eq!(
            invalid.to_string(),
            "Invalid value in column \"year\" at row 3: \"20x0\""
        );
    }

    #[test]
    fn test_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ReportError::EmptyInput);
        assert!(err.source().is_none());
    }
}
