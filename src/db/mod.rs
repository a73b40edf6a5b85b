pub mod tables;

use redb::{Database, Error as RedbError};
use std::path::Path;
use std::sync::Arc;

/// Database handle type (Arc-wrapped for sharing across handlers)
pub type Db = Arc<Database>;

/// Bincode settings shared by every table codec
pub const BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

/// Open or create the redb database at the given path
///
/// Creates all required tables on first run.
#[allow(clippy::result_large_err)]
pub fn open_database(path: impl AsRef<Path>) -> Result<Db, RedbError> {
    tracing::info!("Opening database at: {:?}", path.as_ref());

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.as_ref().parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            tracing::error!("Failed to create database directory: {}", e);
            RedbError::Io(e)
        })?;
    }

    let db = Database::create(path)?;

    let write_txn = db.begin_write()?;
    {
        let _ = write_txn.open_table(tables::QUOTAS)?;
        let _ = write_txn.open_table(tables::USERS)?;
    }
    write_txn.commit()?;

    tracing::info!("Database initialized successfully");

    Ok(Arc::new(db))
}
