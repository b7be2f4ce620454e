//! SQLite persistence for the field sync durable store.

pub mod db;
pub mod errors;
pub mod kv;
pub mod schema;

pub use db::{create_pool, get_connection, init, run_migrations, DbPool, WriteHandle};
pub use errors::StorageError;
pub use kv::SqliteKvStore;
