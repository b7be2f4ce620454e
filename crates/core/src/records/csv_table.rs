//! In-memory view of a delimited project file.

use std::collections::BTreeMap;

use super::records_model::Record;

/// Parsed header row plus data rows, each padded to the header width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn parse(contents: &str) -> Result<Self, csv::Error> {
        let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(contents.as_bytes());

        let headers = reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let mut row = record.iter().map(str::to_string).collect::<Vec<_>>();
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn to_csv_string(&self) -> Result<String, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header.trim() == name)
    }

    /// Index of `name`, appending an empty column when the file lacks it.
    ///
    /// Cells past the header width stay after the new column; rows are never shortened.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        let index = self.headers.len();
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            if row.len() < index {
                row.resize(index, String::new());
            }
            row.insert(index, String::new());
        }
        index
    }

    /// First row whose key cell matches `key`.
    pub fn find_row(&self, key_index: usize, key: &str) -> Option<usize> {
        let key = key.trim();
        self.rows.iter().position(|row| {
            row.get(key_index)
                .map(|cell| cell.trim() == key)
                .unwrap_or(false)
        })
    }

    pub fn record_at(&self, row_index: usize, key_index: usize) -> Option<Record> {
        let row = self.rows.get(row_index)?;
        let values = self
            .headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| (header.trim().to_string(), value.clone()))
            .collect::<BTreeMap<_, _>>();
        Some(Record {
            key: row.get(key_index)?.trim().to_string(),
            values,
        })
    }
}
