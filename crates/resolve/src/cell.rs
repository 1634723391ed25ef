use crate::split::Splitter;
use crate::table::CellValue;

/// Shape of a name-bearing cell, decided once at ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCell {
    Empty,
    Single(String),
    Multiple(Vec<String>),
    /// Not convertible to a name (boolean, spreadsheet error). Never resolved.
    Malformed(String),
}

impl RawCell {
    pub fn from_value(value: &CellValue, splitter: &Splitter) -> Self {
        let text = match value {
            CellValue::Empty => return Self::Empty,
            CellValue::Bool(_) | CellValue::Error(_) => return Self::Malformed(value.display()),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(_) => value.display(),
        };

        let mut names = splitter.split(&text);
        match names.len() {
            0 => Self::Empty,
            1 => Self::Single(names.remove(0)),
            _ => Self::Multiple(names),
        }
    }

    /// Names in original order. Empty for `Empty` and `Malformed`.
    pub fn names(&self) -> &[String] {
        match self {
            Self::Single(name) => std::slice::from_ref(name),
            Self::Multiple(names) => names,
            Self::Empty | Self::Malformed(_) => &[],
        }
    }
}
