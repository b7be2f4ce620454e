//! Connection pool, migrations and the serialized write path.

use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::StorageError;
use fieldsync_core::Result;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const DB_FILE_NAME: &str = "fieldsync.db";

#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), r2d2::Error> {
        conn.batch_execute(
            "PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000; PRAGMA synchronous = NORMAL;",
        )
        .map_err(r2d2::Error::QueryError)
    }
}

/// Opens (creating if needed) the database file inside `data_dir`.
pub fn create_pool(data_dir: &Path) -> Result<Arc<DbPool>> {
    std::fs::create_dir_all(data_dir).map_err(|err| {
        StorageError::Task(format!(
            "Cannot create data directory {}: {}",
            data_dir.display(),
            err
        ))
    })?;
    let db_path = data_dir.join(DB_FILE_NAME);
    let manager = ConnectionManager::<SqliteConnection>::new(db_path.to_string_lossy());
    let pool = Pool::builder()
        .max_size(4)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .map_err(StorageError::from)?;
    Ok(Arc::new(pool))
}

pub fn get_connection(
    pool: &DbPool,
) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
    Ok(pool.get().map_err(StorageError::from)?)
}

pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = get_connection(pool)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| StorageError::Migration(err.to_string()))?;
    if !applied.is_empty() {
        info!("[Storage] Applied {} migration(s)", applied.len());
    }
    Ok(())
}

/// Pool plus writer for a migrated database under `data_dir`.
pub fn init(data_dir: &Path) -> Result<(Arc<DbPool>, WriteHandle)> {
    let pool = create_pool(data_dir)?;
    run_migrations(&pool)?;
    let writer = WriteHandle::new(pool.clone());
    Ok((pool, writer))
}

/// Serializes writes: one job at a time, each inside an immediate transaction,
/// on the blocking thread pool.
#[derive(Clone)]
pub struct WriteHandle {
    pool: Arc<DbPool>,
    lock: Arc<Mutex<()>>,
}

impl WriteHandle {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self {
            pool,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn exec<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let _guard = self.lock.lock().await;
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = get_connection(&pool)?;
            conn.immediate_transaction::<T, StorageError, _>(|conn| {
                job(conn).map_err(StorageError::Core)
            })
            .map_err(fieldsync_core::Error::from)
        })
        .await
        .map_err(|err| StorageError::Task(err.to_string()))?
    }
}

/// Runs a read on the blocking thread pool.
pub async fn read<T, F>(pool: &Arc<DbPool>, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = get_connection(&pool)?;
        job(&mut conn)
    })
    .await
    .map_err(|err| StorageError::Task(err.to_string()))?
}
