//! `stationsplit-adif`: ADIF file IO and the DXCC reference table.

pub mod dxcc;
pub mod error;
pub mod read;
pub mod write;

pub use dxcc::{load_reference_table, LoadOutput, ReferenceTable};
pub use error::AdifError;
pub use read::{parse_str, read_file, ParseOutput};
pub use write::{serialize_records, write_partitions, WriteReport, WrittenFile};
