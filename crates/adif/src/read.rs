//! Tolerant ADIF reader.
//!
//! Scans `<NAME:length[:type]>value` tags byte-wise; the length prefix is a
//! byte count. Anything outside tags is ignored. Malformed tags are skipped
//! with a warning and never abort the load.

use std::path::Path;

use stationsplit_engine::model::LogRecord;

use crate::error::AdifError;

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub records: Vec<LogRecord>,
    pub warnings: Vec<String>,
}

/// Read and parse an ADIF file.
pub fn read_file(path: &Path) -> Result<ParseOutput, AdifError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AdifError::Io(format!("cannot read {}: {e}", path.display())))?;
    Ok(parse_str(&content))
}

/// Parse ADIF text into log records.
pub fn parse_str(content: &str) -> ParseOutput {
    let bytes = content.as_bytes();
    let mut out = ParseOutput::default();

    // Header fields are only recognized when an explicit <EOH> exists;
    // otherwise everything is record data.
    let mut in_header = content.to_uppercase().contains("<EOH");

    let mut current = LogRecord::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let Some(lt) = find_byte(bytes, pos, b'<') else {
            break;
        };
        pos = lt + 1;
        let Some(gt) = find_byte(bytes, pos, b'>') else {
            out.warnings.push("unterminated tag at end of input".to_string());
            break;
        };
        let tag = String::from_utf8_lossy(&bytes[pos..gt]).to_string();
        pos = gt + 1;

        let mut parts = tag.splitn(3, ':');
        let name = parts.next().unwrap_or("").trim().to_uppercase();

        match name.as_str() {
            "EOH" => {
                in_header = false;
                current = LogRecord::new();
                continue;
            }
            "EOR" => {
                if !current.is_empty() {
                    out.records.push(std::mem::take(&mut current));
                } else {
                    current = LogRecord::new();
                }
                continue;
            }
            "EOT" => break,
            _ => {}
        }

        let Some(len_str) = parts.next() else {
            out.warnings
                .push(format!("tag without length skipped: <{tag}>"));
            continue;
        };
        let Ok(len) = len_str.trim().parse::<usize>() else {
            out.warnings
                .push(format!("tag with invalid length skipped: <{tag}>"));
            continue;
        };

        // Length claims beyond the input (or beyond usize) are truncation.
        let end = match pos.checked_add(len) {
            Some(end) if end <= bytes.len() => end,
            _ => {
                out.warnings
                    .push(format!("truncated value for field {name}"));
                break;
            }
        };
        let value = String::from_utf8_lossy(&bytes[pos..end]).to_string();
        pos = end;

        if !in_header && !name.is_empty() {
            current.set(&name, value);
        }
    }

    if !current.is_empty() {
        out.warnings
            .push("trailing record without <EOR> kept".to_string());
        out.records.push(current);
    }

    out
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from..].iter().position(|&b| b == needle).map(|i| from + i)
}
