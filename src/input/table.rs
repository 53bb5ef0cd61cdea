use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::input::compressed::read_upload;
use crate::input::{InputError, UploadLimits};

/// An uploaded table exactly as read: trimmed header names and string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub source: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }
}

pub fn load_table(
    path: &Path,
    delimiter: u8,
    limits: &UploadLimits,
) -> Result<RawTable, InputError> {
    let bytes = read_upload(path, limits.max_bytes)?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    parse_table(&bytes, delimiter, limits, &path.display().to_string())
}

pub fn parse_table(
    bytes: &[u8],
    delimiter: u8,
    limits: &UploadLimits,
    source: &str,
) -> Result<RawTable, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect::<Vec<_>>();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(InputError::Empty(format!("{source} has no header row")));
    }

    let mut seen = HashSet::new();
    for name in &columns {
        if !seen.insert(name.as_str()) {
            warn!("{source}: duplicate column {name:?}; the first occurrence is used");
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if rows.len() == limits.max_rows {
            return Err(InputError::TooLarge {
                unit: "rows",
                actual: rows.len() as u64 + 1,
                limit: limits.max_rows as u64,
            });
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    if rows.is_empty() {
        return Err(InputError::Empty(format!("{source} has no data rows")));
    }

    Ok(RawTable {
        source: source.to_string(),
        columns,
        rows,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/table.rs"]
mod tests;
