// JSON import/export (array of records)

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde_json::{Map, Value};

use portavoz_resolve::{CellValue, Table};

/// Import an array of objects. Headers are the union of keys in first-seen order.
pub fn import(path: &Path) -> Result<Table, String> {
    let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let value: Value = serde_json::from_reader(BufReader::new(file)).map_err(|e| e.to_string())?;
    from_value(value)
}

fn from_value(value: Value) -> Result<Table, String> {
    let Value::Array(items) = value else {
        return Err("expected a JSON array of records".to_string());
    };

    let mut records: Vec<Map<String, Value>> = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => records.push(map),
            _ => return Err(format!("record {} is not an object", idx)),
        }
    }

    let mut headers: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut table = Table::new(headers.clone());
    for record in &records {
        table.push_row(
            headers
                .iter()
                .map(|h| record.get(h).map_or(CellValue::Empty, cell_value))
                .collect(),
        );
    }
    Ok(table)
}

fn cell_value(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::String(s) => CellValue::text(s.as_str()),
        Value::Number(n) => n.as_f64().map_or(CellValue::Empty, CellValue::Number),
        Value::Bool(b) => CellValue::Bool(*b),
        // Nested structures have no name reading
        other => CellValue::Error(other.to_string()),
    }
}

/// Export as a JSON array of objects keyed by header, empty cells as null.
pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let writer = BufWriter::new(file);

    let records: Vec<Map<String, Value>> = table
        .rows()
        .iter()
        .map(|row| {
            table
                .headers()
                .iter()
                .zip(row)
                .map(|(h, cell)| (h.clone(), json_value(cell)))
                .collect()
        })
        .collect();

    serde_json::to_writer_pretty(writer, &records).map_err(|e| e.to_string())?;
    Ok(())
}

fn json_value(cell: &CellValue) -> Value {
    match cell {
        CellValue::Empty => Value::Null,
        CellValue::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Text(s) | CellValue::Error(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_json_import_keeps_key_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.json");
        fs::write(
            &path,
            r#"[{"Titulo": "News 1", "Porta-vozes": "Ana Lima"},
                {"Titulo": "News 2", "Extra": 3}]"#,
        )
        .unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.headers(), &["Titulo", "Porta-vozes", "Extra"]);
        assert_eq!(table.cell(0, 1).display(), "Ana Lima");
        assert!(table.cell(1, 1).is_empty());
        assert_eq!(table.cell(1, 2), &CellValue::Number(3.0));
    }

    #[test]
    fn test_json_import_rejects_non_records() {
        assert!(from_value(serde_json::json!({"a": 1})).is_err());
        assert!(from_value(serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_json_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let table = Table::from_strings(
            &["Porta-vozes", "ID Porta-vozes"],
            &[&["Ana Lima", "7"], &["Zé", ""]],
        );

        export(&table, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed[0]["ID Porta-vozes"], "7");
        assert!(parsed[1]["ID Porta-vozes"].is_null());
        let keys: Vec<&String> = parsed[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Porta-vozes", "ID Porta-vozes"]);
    }
}
