use std::collections::HashMap;

/// A single scalar read from the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    /// `raw` is the trimmed source text and is the cell's identity; `value` only orders and grades.
    Number { value: f64, raw: String },
    Text(String),
}

impl Cell {
    /// Trims the raw text. Empty becomes `Null`, finite numbers become `Number`.
    pub fn parse(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Cell::Number {
                value,
                raw: trimmed.to_string(),
            },
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    /// A number that arrived without source text, e.g. a workbook float.
    /// Integral values that convert exactly print without a fractional part.
    pub fn number(value: f64) -> Cell {
        if !value.is_finite() {
            return Cell::Null;
        }
        Cell::Number {
            value,
            raw: format_number(value),
        }
    }

    /// Label used both for grouping and for display.
    pub fn label(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Number { raw, .. } => Some(raw.clone()),
            Cell::Text(text) => Some(text.clone()),
        }
    }

    /// Grade on the 0-100 scale; anything that is not a number is a null grade.
    pub fn as_grade(&self) -> Option<f64> {
        match self {
            Cell::Null => None,
            Cell::Number { value, .. } => Some(*value),
            Cell::Text(text) => text
                .trim()
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite()),
        }
    }
}

/// 2^53: above this an `f64` no longer holds every integer.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < EXACT_INTEGER_LIMIT {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// In-memory dataset. Column names are upper-cased and trimmed on construction.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let columns: Vec<String> = headers.iter().map(|h| normalize_column_name(h)).collect();
        let mut index = HashMap::new();
        for (position, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(position);
        }

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Null);
                row
            })
            .collect();

        Table {
            columns,
            index,
            rows,
        }
    }

    /// Builds a table from raw text cells, parsing each one with [`Cell::parse`].
    pub fn from_text_rows<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> Self {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| Cell::parse(cell.as_ref())).collect())
                .collect(),
        )
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cells_defensively() {
        assert_eq!(Cell::parse("  "), Cell::Null);
        assert_eq!(
            Cell::parse(" 85 "),
            Cell::Number {
                value: 85.0,
                raw: "85".to_string()
            }
        );
        assert_eq!(Cell::parse("NP"), Cell::Text("NP".to_string()));
        assert_eq!(Cell::parse("NaN"), Cell::Text("NaN".to_string()));
    }

    #[test]
    fn grades_ignore_non_numeric_values() {
        assert_eq!(Cell::parse("69.5").as_grade(), Some(69.5));
        assert_eq!(Cell::Text("69,5".to_string()).as_grade(), Some(69.5));
        assert_eq!(Cell::Text("AC".to_string()).as_grade(), None);
        assert_eq!(Cell::Null.as_grade(), None);
    }

    #[test]
    fn labels_keep_the_source_text() {
        assert_eq!(Cell::parse("007").label().as_deref(), Some("007"));
        assert_eq!(Cell::parse("2020.0").label().as_deref(), Some("2020.0"));
        assert_eq!(
            Cell::parse("12345678901234567891").label().as_deref(),
            Some("12345678901234567891")
        );
        assert_eq!(Cell::Null.label(), None);
    }

    #[test]
    fn workbook_numbers_label_exactly() {
        assert_eq!(Cell::number(2020.0).label().as_deref(), Some("2020"));
        assert_eq!(Cell::number(7.25).label().as_deref(), Some("7.25"));
        assert_eq!(Cell::number(f64::NAN), Cell::Null);
        assert_eq!(Cell::number(1e17).label().as_deref(), Some("100000000000000000"));
    }

    #[test]
    fn column_names_are_normalized() {
        let table = Table::from_text_rows(&[" pe ", "Aluctr"], &[vec!["ISC", "1"], vec!["IGE"]]);
        assert_eq!(table.columns(), &["PE".to_string(), "ALUCTR".to_string()]);
        assert!(table.has_column("PE"));
        assert!(!table.has_column("pe"));
        assert_eq!(table.rows()[1][1], Cell::Null);
    }
}
