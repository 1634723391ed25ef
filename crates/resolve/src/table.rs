use serde::Serialize;

/// A loaded cell. IO crates map their native cell types onto this.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Spreadsheet error value (`#N/A`, `#REF!`, ...).
    Error(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Display text. Integral numbers drop the fractional part (`101.0` → `101`).
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => {
                if *b {
                    "TRUE".into()
                } else {
                    "FALSE".into()
                }
            }
            Self::Error(e) => e.clone(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Header row plus data rows. Row indices are 0-based and exclude the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Build from string rows; empty strings become `CellValue::Empty`.
    pub fn from_strings(headers: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Self::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|v| CellValue::text(*v)).collect());
        }
        table
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Append a row, padding or truncating to the header width.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.headers.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Empty)
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    /// Index of the column `label`, appending an empty column if absent.
    pub fn ensure_column(&mut self, label: &str) -> usize {
        if let Some(idx) = self.column_index(label) {
            return idx;
        }
        self.headers.push(label.to_string());
        for row in &mut self.rows {
            row.push(CellValue::Empty);
        }
        self.headers.len() - 1
    }

    /// Display text of column `label`, one entry per row.
    pub fn column_display(&self, label: &str) -> Option<Vec<String>> {
        let idx = self.column_index(label)?;
        Some(self.rows.iter().map(|r| r[idx].display()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!(CellValue::Number(101.0).display(), "101");
        assert_eq!(CellValue::Number(1.5).display(), "1.5");
        assert_eq!(CellValue::Number(-3.0).display(), "-3");
    }

    #[test]
    fn ensure_column_appends_once() {
        let mut t = Table::from_strings(&["Name"], &[&["Ana"], &["Rui"]]);
        let idx = t.ensure_column("ID Name");
        assert_eq!(idx, 1);
        assert_eq!(t.ensure_column("ID Name"), 1);
        assert_eq!(t.headers().len(), 2);
        assert_eq!(t.cell(1, 1), &CellValue::Empty);
    }

    #[test]
    fn push_row_pads_to_header_width() {
        let mut t = Table::new(vec!["a".into(), "b".into(), "c".into()]);
        t.push_row(vec![CellValue::text("x")]);
        assert_eq!(t.rows()[0].len(), 3);
        assert!(t.cell(0, 2).is_empty());
    }

    #[test]
    fn out_of_range_cell_is_empty() {
        let t = Table::from_strings(&["a"], &[&["x"]]);
        assert_eq!(t.cell(5, 5), &CellValue::Empty);
    }

    #[test]
    fn whitespace_text_counts_as_empty() {
        assert!(CellValue::text("  ").is_empty());
        assert!(CellValue::text("").is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }
}
