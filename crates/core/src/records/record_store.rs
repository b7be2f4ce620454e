//! Local project file access: read and update single rows by key.

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::csv_table::CsvTable;
use super::records_model::{Record, RecordUpdate, KEY_COLUMN};
use crate::errors::{Error, Result};

#[async_trait]
pub trait RecordStoreTrait: Send + Sync {
    async fn read_record(&self, file_id: &str, key: &str) -> Result<Record>;

    /// Merges non-blank payload values into the row and rewrites the file.
    async fn update_record(&self, file_id: &str, key: &str, update: &RecordUpdate)
        -> Result<Record>;

    /// All rows, ordered by numeric key.
    async fn list_records(&self, file_id: &str) -> Result<Vec<Record>>;

    async fn read_contents(&self, file_id: &str) -> Result<String>;

    async fn write_contents(&self, file_id: &str, contents: &str) -> Result<()>;
}

/// Record store over comma-separated files on the local filesystem.
///
/// The file identifier is the file path. Every update rewrites the whole file
/// through a temporary sibling that is renamed over the original.
pub struct CsvRecordStore {
    key_column: String,
    write_lock: Mutex<()>,
}

impl Default for CsvRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvRecordStore {
    pub fn new() -> Self {
        Self::with_key_column(KEY_COLUMN)
    }

    pub fn with_key_column(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            write_lock: Mutex::new(()),
        }
    }
}

async fn run_blocking<T, F>(file_id: &str, task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| Error::file_unavailable(file_id, format!("File task failed: {}", e)))?
}

fn load_table(path: &Path, file_id: &str) -> Result<CsvTable> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::file_unavailable(file_id, e.to_string()))?;
    CsvTable::parse(&contents)
        .map_err(|e| Error::file_unavailable(file_id, format!("Malformed file: {}", e)))
}

fn key_index(table: &CsvTable, key_column: &str, file_id: &str) -> Result<usize> {
    table.column_index(key_column).ok_or_else(|| {
        Error::file_unavailable(file_id, format!("Missing key column '{}'", key_column))
    })
}

fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<Decimal>(), b.parse::<Decimal>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn read_record_blocking(path: &Path, file_id: &str, key_column: &str, key: &str) -> Result<Record> {
    let table = load_table(path, file_id)?;
    let key_idx = key_index(&table, key_column, file_id)?;
    table
        .find_row(key_idx, key)
        .and_then(|row| table.record_at(row, key_idx))
        .ok_or_else(|| Error::not_found(file_id, key))
}

fn update_record_blocking(
    path: &Path,
    file_id: &str,
    key_column: &str,
    key: &str,
    update: &RecordUpdate,
) -> Result<Record> {
    let mut table = load_table(path, file_id)?;
    let key_idx = key_index(&table, key_column, file_id)?;
    let row_idx = table
        .find_row(key_idx, key)
        .ok_or_else(|| Error::not_found(file_id, key))?;

    let mut changed = false;
    for (field, value) in update.effective_values() {
        let column = table.ensure_column(field.column());
        let cell = &mut table.rows[row_idx][column];
        if cell.as_str() != value {
            *cell = value.to_string();
            changed = true;
        }
    }

    if changed {
        let contents = table
            .to_csv_string()
            .map_err(|e| Error::file_unavailable(file_id, format!("Serialize failed: {}", e)))?;
        write_atomic(path, &contents).map_err(|e| Error::file_unavailable(file_id, e.to_string()))?;
        debug!("[RecordStore] Rewrote {} after updating '{}'", file_id, key);
    }

    table
        .record_at(row_idx, key_idx)
        .ok_or_else(|| Error::not_found(file_id, key))
}

fn list_records_blocking(path: &Path, file_id: &str, key_column: &str) -> Result<Vec<Record>> {
    let table = load_table(path, file_id)?;
    let key_idx = key_index(&table, key_column, file_id)?;
    let mut records = (0..table.rows.len())
        .filter_map(|row| table.record_at(row, key_idx))
        .collect::<Vec<_>>();
    records.sort_by(|a, b| compare_keys(&a.key, &b.key));
    Ok(records)
}

#[async_trait]
impl RecordStoreTrait for CsvRecordStore {
    async fn read_record(&self, file_id: &str, key: &str) -> Result<Record> {
        let path = PathBuf::from(file_id);
        let owned_id = file_id.to_string();
        let key_column = self.key_column.clone();
        let key = key.to_string();
        run_blocking(file_id, move || {
            read_record_blocking(&path, &owned_id, &key_column, &key)
        })
        .await
    }

    async fn update_record(
        &self,
        file_id: &str,
        key: &str,
        update: &RecordUpdate,
    ) -> Result<Record> {
        let _guard = self.write_lock.lock().await;
        let path = PathBuf::from(file_id);
        let owned_id = file_id.to_string();
        let key_column = self.key_column.clone();
        let key = key.to_string();
        let update = update.clone();
        run_blocking(file_id, move || {
            update_record_blocking(&path, &owned_id, &key_column, &key, &update)
        })
        .await
    }

    async fn list_records(&self, file_id: &str) -> Result<Vec<Record>> {
        let path = PathBuf::from(file_id);
        let owned_id = file_id.to_string();
        let key_column = self.key_column.clone();
        run_blocking(file_id, move || {
            list_records_blocking(&path, &owned_id, &key_column)
        })
        .await
    }

    async fn read_contents(&self, file_id: &str) -> Result<String> {
        tokio::fs::read_to_string(file_id)
            .await
            .map_err(|e| Error::file_unavailable(file_id, e.to_string()))
    }

    async fn write_contents(&self, file_id: &str, contents: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = PathBuf::from(file_id);
        let owned_id = file_id.to_string();
        let contents = contents.to_string();
        run_blocking(file_id, move || {
            write_atomic(&path, &contents).map_err(|e| Error::file_unavailable(owned_id, e.to_string()))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MutableField;
    use tempfile::tempdir;

    const PROJECT: &str = "TEST POINT,LINE ITEM,TREATMENT TYPE,Chainage,Latitude,Longitude,Pavement Thickness (mm),Comments\n\
10,LI-3,Reseal,300,-33.1,151.2,,\n\
1,LI-1,Asphalt,100,-33.0,151.0,150,\n\
2,LI-2,\"Seal, double\",200,-33.05,151.1,,old note\n";

    fn write_project(dir: &Path) -> String {
        let path = dir.join("project.csv");
        std::fs::write(&path, PROJECT).expect("write project");
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn read_record_finds_row_by_key() {
        let dir = tempdir().expect("tempdir");
        let file_id = write_project(dir.path());
        let store = CsvRecordStore::new();

        let record = store.read_record(&file_id, "2").await.expect("read");
        assert_eq!(record.key, "2");
        assert_eq!(record.get("TREATMENT TYPE"), Some("Seal, double"));
        assert_eq!(record.field(MutableField::Comments), Some("old note"));
    }

    #[tokio::test]
    async fn read_record_missing_key_is_not_found() {
        let dir = tempdir().expect("tempdir");
        let file_id = write_project(dir.path());
        let store = CsvRecordStore::new();

        let err = store.read_record(&file_id, "99").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_file_unavailable() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("nope.csv").to_string_lossy().to_string();
        let store = CsvRecordStore::new();

        let err = store.read_record(&missing, "1").await.unwrap_err();
        assert!(matches!(err, Error::FileUnavailable { .. }));
    }

    #[tokio::test]
    async fn file_without_key_column_is_file_unavailable() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "A,B\n1,2\n").expect("write");
        let store = CsvRecordStore::new();

        let err = store
            .read_record(&path.to_string_lossy(), "1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FileUnavailable { .. }));
    }

    #[tokio::test]
    async fn update_merges_and_keeps_existing_values() {
        let dir = tempdir().expect("tempdir");
        let file_id = write_project(dir.path());
        let store = CsvRecordStore::new();

        let update = RecordUpdate::new()
            .with(MutableField::Comments, "ok")
            .with(MutableField::PavementThickness, "");
        let record = store
            .update_record(&file_id, "1", &update)
            .await
            .expect("update");

        assert_eq!(record.field(MutableField::Comments), Some("ok"));
        assert_eq!(record.field(MutableField::PavementThickness), Some("150"));
    }

    #[tokio::test]
    async fn update_then_read_round_trips_and_leaves_other_rows_alone() {
        let dir = tempdir().expect("tempdir");
        let file_id = write_project(dir.path());
        let store = CsvRecordStore::new();
        let before_other = store.read_record(&file_id, "2").await.expect("read other");

        let update = RecordUpdate::new()
            .with(MutableField::RoadWidthTotal, "6.20")
            .with(MutableField::LineItemCompleted, "true");
        store
            .update_record(&file_id, "10", &update)
            .await
            .expect("update");

        let record = store.read_record(&file_id, "10").await.expect("read");
        assert_eq!(record.field(MutableField::RoadWidthTotal), Some("6.20"));
        assert_eq!(record.field(MutableField::LineItemCompleted), Some("true"));
        assert_eq!(record.get("Chainage"), Some("300"));

        let mut after_other = store.read_record(&file_id, "2").await.expect("read other");
        // New columns appear as empty cells on untouched rows.
        after_other
            .values
            .retain(|column, _| before_other.values.contains_key(column));
        assert_eq!(after_other, before_other);
    }

    #[tokio::test]
    async fn appending_a_column_keeps_overlong_rows_intact() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ragged.csv");
        std::fs::write(&path, "TEST POINT,LINE ITEM\n1,LI-1\n2,LI-2,stray,more").expect("write");
        let file_id = path.to_string_lossy().to_string();
        let store = CsvRecordStore::new();

        store
            .update_record(&file_id, "1", &RecordUpdate::new().with(MutableField::Comments, "ok"))
            .await
            .expect("update");

        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "TEST POINT,LINE ITEM,Comments\n1,LI-1,ok\n2,LI-2,,stray,more\n"
        );
        let other = store.read_record(&file_id, "2").await.expect("read other");
        assert_eq!(other.field(MutableField::Comments), Some(""));
    }

    #[tokio::test]
    async fn update_missing_key_leaves_file_untouched() {
        let dir = tempdir().expect("tempdir");
        let file_id = write_project(dir.path());
        let store = CsvRecordStore::new();

        let update = RecordUpdate::new().with(MutableField::Comments, "x");
        let err = store
            .update_record(&file_id, "404", &update)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(std::fs::read_to_string(&file_id).expect("read"), PROJECT);
    }

    #[tokio::test]
    async fn list_records_orders_by_numeric_key() {
        let dir = tempdir().expect("tempdir");
        let file_id = write_project(dir.path());
        let store = CsvRecordStore::new();

        let keys = store
            .list_records(&file_id)
            .await
            .expect("list")
            .into_iter()
            .map(|record| record.key)
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["1", "2", "10"]);
    }

    #[tokio::test]
    async fn write_contents_replaces_file() {
        let dir = tempdir().expect("tempdir");
        let file_id = write_project(dir.path());
        let store = CsvRecordStore::new();

        store
            .write_contents(&file_id, "TEST POINT\n5\n")
            .await
            .expect("write");
        assert_eq!(
            store.read_contents(&file_id).await.expect("read"),
            "TEST POINT\n5\n"
        );
    }

    #[test]
    fn non_numeric_keys_sort_after_numeric() {
        let mut keys = vec!["TP-2", "3", "TP-1", "1.5"];
        keys.sort_by(|a, b| compare_keys(a, b));
        assert_eq!(keys, vec!["1.5", "3", "TP-1", "TP-2"]);
    }

    #[test]
    fn float_spellings_are_not_numeric_keys() {
        let mut keys = vec!["inf", "10", "NaN", "2", "2.0", "-inf"];
        keys.sort_by(|a, b| compare_keys(a, b));
        assert_eq!(keys, vec!["2", "2.0", "10", "-inf", "NaN", "inf"]);
    }
}
