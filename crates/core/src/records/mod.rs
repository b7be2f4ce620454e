//! Project file records.

mod csv_table;
mod record_store;
mod records_model;

pub use record_store::{CsvRecordStore, RecordStoreTrait};
pub use records_model::*;
