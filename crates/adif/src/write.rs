//! ADIF serialization and partition file output.
//!
//! Framing: a free-text header line, `PROGRAMID`/`PROGRAMVERSION` tags and
//! `<EOH>`, then one `<EOR>`-terminated line per record and a final `<EOT>`.
//! Lines end in CRLF. Empty fields are omitted; values are trimmed and
//! uppercased before the byte length is computed.

use std::path::{Path, PathBuf};

use stationsplit_engine::model::LogRecord;
use stationsplit_engine::partition::Partition;

use crate::error::AdifError;

const PROGRAM_ID: &str = "stationsplit";
const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One tag for a non-empty field, with a trailing space. Empty fields
/// serialize to nothing.
pub fn format_field(name: &str, value: &str) -> String {
    let value = value.trim().to_uppercase();
    if value.is_empty() {
        return String::new();
    }
    format!("<{}:{}>{} ", name.to_uppercase(), value.len(), value)
}

/// Serialize records into a complete ADIF document.
pub fn serialize_records(records: &[LogRecord]) -> String {
    let mut out = String::new();
    out.push_str("ADIF export generated by stationsplit\r\n");
    out.push_str(&format!(
        "<PROGRAMID:{}>{} <PROGRAMVERSION:{}>{} <EOH>\r\n\r\n",
        PROGRAM_ID.len(),
        PROGRAM_ID,
        PROGRAM_VERSION.len(),
        PROGRAM_VERSION,
    ));

    for record in records {
        for (name, value) in record.fields() {
            out.push_str(&format_field(name, value));
        }
        out.push_str("<EOR>\r\n");
    }

    out.push_str("<EOT>\r\n");
    out
}

/// One file successfully written by [`write_partitions`].
#[derive(Debug)]
pub struct WrittenFile {
    pub export_key: String,
    pub path: PathBuf,
    pub record_count: usize,
}

#[derive(Debug, Default)]
pub struct WriteReport {
    pub files: Vec<WrittenFile>,
    pub warnings: Vec<String>,
}

/// Write one `{export_key}.adi` file per partition into `dir`.
///
/// A missing output directory is created; failure to create it is fatal.
/// A failure on an individual file is reported as a warning and the
/// remaining partitions are still written.
pub fn write_partitions(dir: &Path, partitions: &[Partition]) -> Result<WriteReport, AdifError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AdifError::Io(format!("cannot create {}: {e}", dir.display())))?;

    let mut report = WriteReport::default();
    for partition in partitions {
        let path = dir.join(format!("{}.adi", partition.export_key));
        match std::fs::write(&path, serialize_records(&partition.records)) {
            Ok(()) => report.files.push(WrittenFile {
                export_key: partition.export_key.clone(),
                path,
                record_count: partition.records.len(),
            }),
            Err(e) => report
                .warnings
                .push(format!("cannot write {}: {e}", path.display())),
        }
    }
    Ok(report)
}
