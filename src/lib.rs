//! Listings Admin Server Library
//!
//! Admin pages and endpoints for viewing and setting each user's available
//! listings count. Exported for the binary and for tests.

pub mod config;
pub mod constants;
pub mod db;
pub mod directory;
pub mod error;
pub mod models;
pub mod routes;
pub mod security;
pub mod store;
pub mod views;

pub use config::Config;
pub use db::{Db, open_database};
pub use directory::{RedbUserDirectory, UserDirectory};
pub use error::{AppError, Result};
pub use routes::router;
pub use store::{QuotaBackend, QuotaStore, RedbQuotaBackend};

use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub store: QuotaStore,
    pub directory: Arc<dyn UserDirectory>,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState backed entirely by the given database
    pub fn new(db: Db, config: Config) -> Self {
        let directory: Arc<dyn UserDirectory> = Arc::new(RedbUserDirectory::new(db.clone()));
        let backend: Arc<dyn QuotaBackend> = Arc::new(RedbQuotaBackend::new(db.clone()));
        Self::with_parts(db, backend, directory, config)
    }

    /// Create an AppState with an explicit quota backend and directory
    pub fn with_parts(
        db: Db,
        backend: Arc<dyn QuotaBackend>,
        directory: Arc<dyn UserDirectory>,
        config: Config,
    ) -> Self {
        let store = QuotaStore::new(backend, directory.clone());
        Self {
            db,
            store,
            directory,
            config,
        }
    }
}
