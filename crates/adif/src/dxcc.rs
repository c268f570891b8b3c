//! DXCC reference table.
//!
//! Maps numeric entity identifiers to display names and back. Loaded from a CSV
//! file with either comma or semicolon delimiters; the delimiter is
//! sniffed from the first data line.

use std::collections::HashMap;
use std::path::Path;

use crate::error::AdifError;

pub const UNSPECIFIED_ID: &str = "0";
pub const UNSPECIFIED_NAME: &str = "N/A (not defined)";

/// Lookup table between entity identifiers and names, both directions.
/// The `"0"` entry is built in and cannot be replaced by loaded data.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    entries: HashMap<String, String>,
    ids_by_name: HashMap<String, String>,
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceTable {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(UNSPECIFIED_ID.to_string(), UNSPECIFIED_NAME.to_string());
        let mut ids_by_name = HashMap::new();
        ids_by_name.insert(UNSPECIFIED_NAME.to_string(), UNSPECIFIED_ID.to_string());
        Self { entries, ids_by_name }
    }

    /// Insert an entry. Returns `false` when the identifier is already
    /// present; the first occurrence wins, in both directions.
    pub fn insert(&mut self, id: &str, name: &str) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        self.entries.insert(id.to_string(), name.to_string());
        self.ids_by_name
            .entry(name.to_string())
            .or_insert_with(|| id.to_string());
        true
    }

    pub fn name_for(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    /// Reverse lookup: first identifier registered under a name.
    pub fn id_for(&self, name: &str) -> Option<&str> {
        self.ids_by_name.get(name).map(String::as_str)
    }

    /// Display label for an identifier, falling back to the bare
    /// identifier when it is unknown.
    pub fn label_for(&self, id: &str) -> String {
        match self.name_for(id) {
            Some(name) => format!("{name} (ID: {id})"),
            None => id.to_string(),
        }
    }

    /// All labels sorted by name, with the unspecified entry first.
    pub fn combo_list(&self) -> Vec<String> {
        let mut rest: Vec<(&String, &String)> = self
            .entries
            .iter()
            .filter(|(id, _)| id.as_str() != UNSPECIFIED_ID)
            .collect();
        rest.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));

        let mut labels = vec![format!("{UNSPECIFIED_NAME} (ID: {UNSPECIFIED_ID})")];
        labels.extend(rest.into_iter().map(|(id, name)| format!("{name} (ID: {id})")));
        labels
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug)]
pub struct LoadOutput {
    pub table: ReferenceTable,
    pub warnings: Vec<String>,
}

/// Load a reference table from a CSV file.
///
/// The first line is treated as a header and skipped. Each data line
/// needs a numeric identifier followed by a name; anything else is
/// skipped with a warning. Duplicate identifiers keep the first value.
pub fn load_reference_table(path: &Path) -> Result<LoadOutput, AdifError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AdifError::Io(format!("cannot read {}: {e}", path.display())))?;

    let delimiter = sniff_delimiter(&content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut table = ReferenceTable::new();
    let mut warnings = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let line = index + 2;
        let record = match row {
            Ok(record) => record,
            Err(e) => {
                warnings.push(format!("line {line}: unreadable row skipped ({e})"));
                continue;
            }
        };

        let id = record.get(0).unwrap_or("").trim();
        let name = record.get(1).unwrap_or("").trim();

        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            warnings.push(format!("line {line}: non-numeric identifier skipped"));
            continue;
        }
        if name.is_empty() {
            warnings.push(format!("line {line}: entry {id} has no name, skipped"));
            continue;
        }
        if !table.insert(id, name) {
            warnings.push(format!("line {line}: duplicate identifier {id} skipped"));
        }
    }

    Ok(LoadOutput { table, warnings })
}

// Per the source format, a file uses one delimiter throughout. Comma wins
// when the first data line contains one, matching how exports are written.
fn sniff_delimiter(content: &str) -> u8 {
    for line in content.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        return if line.contains(',') { b',' } else { b';' };
    }
    b','
}
