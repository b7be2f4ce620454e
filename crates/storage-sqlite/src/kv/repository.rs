use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use fieldsync_core::store::DurableStore;
use fieldsync_core::Result;

use super::model::KvEntryDB;
use crate::db::{read, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::kv_store;

/// `DurableStore` backed by the `kv_store` table.
pub struct SqliteKvStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteKvStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn upsert(conn: &mut SqliteConnection, entry: KvEntryDB) -> Result<()> {
    diesel::insert_into(kv_store::table)
        .values(&entry)
        .on_conflict(kv_store::key)
        .do_update()
        .set((
            kv_store::value.eq(&entry.value),
            kv_store::updated_at.eq(&entry.updated_at),
        ))
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

#[async_trait]
impl DurableStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        read(&self.pool, move |conn| {
            Ok(kv_store::table
                .find(&key)
                .select(kv_store::value)
                .first::<String>(conn)
                .optional()
                .map_err(StorageError::from)?)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry = KvEntryDB {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: Utc::now().to_rfc3339(),
        };
        self.writer.exec(move |conn| upsert(conn, entry)).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.writer
            .exec(move |conn| {
                diesel::delete(kv_store::table.find(&key))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
