use crate::config::ColumnsConfig;
use crate::normalize::normalize;

/// Pick name-bearing columns by header text.
///
/// A header qualifies when its normalized text contains the normalized
/// pattern and it is not itself a companion identifier column.
pub fn detect_name_columns(headers: &[String], config: &ColumnsConfig) -> Vec<String> {
    let pattern = normalize(&config.detect_pattern);
    let id_prefix = normalize(&config.id_prefix);

    headers
        .iter()
        .filter(|h| {
            let key = normalize(h);
            !pattern.is_empty() && key.contains(&pattern) && !is_id_column(&key, &id_prefix)
        })
        .cloned()
        .collect()
}

/// Explicit columns when configured, otherwise detected ones. A column named
/// more than once is kept at its first position.
pub fn name_columns(headers: &[String], config: &ColumnsConfig) -> Vec<String> {
    if config.names.is_empty() {
        return detect_name_columns(headers, config);
    }
    let mut columns: Vec<String> = Vec::with_capacity(config.names.len());
    for name in &config.names {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }
    columns
}

fn is_id_column(key: &str, id_prefix: &str) -> bool {
    // "ID " normalizes to "id"; require a word boundary after it
    !id_prefix.is_empty()
        && key
            .strip_prefix(id_prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
}
