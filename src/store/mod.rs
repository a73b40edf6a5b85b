//! Per-user listings quota: read, and insert-or-update.
//!
//! Concurrent writers for one user are not coordinated here. redb serializes
//! write transactions, so the last committed write wins and a user never
//! ends up with more than one record.

mod redb_backend;

pub use redb_backend::RedbQuotaBackend;

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

use crate::directory::UserDirectory;
use crate::error::{AppError, Result};
use crate::models::{QuotaRecord, UserId, clamp_quota};

/// Storage boundary for quota records, keyed by user id
pub trait QuotaBackend: Send + Sync {
    fn find_by_user(&self, user_id: UserId) -> Result<Option<QuotaRecord>>;

    /// Create `record`; returns false without writing if one already exists
    fn insert(&self, record: &QuotaRecord) -> Result<bool>;

    /// Change the quota of an existing record; returns false if there is none
    fn update_quota(&self, user_id: UserId, quota: u32, updated_at: i64) -> Result<bool>;
}

/// Quota reads and writes on top of a backend and the user directory
#[derive(Clone)]
pub struct QuotaStore {
    backend: Arc<dyn QuotaBackend>,
    directory: Arc<dyn UserDirectory>,
}

impl QuotaStore {
    pub fn new(backend: Arc<dyn QuotaBackend>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { backend, directory }
    }

    /// Current quota for `user_id`; users without a record have 0
    pub async fn get(&self, user_id: UserId) -> Result<u32> {
        let backend = self.backend.clone();
        let record = tokio::task::spawn_blocking(move || backend.find_by_user(user_id)).await??;
        Ok(record.map_or(0, |r| r.quota))
    }

    /// Quotas for several users in one blocking task
    pub async fn get_many(&self, user_ids: Vec<UserId>) -> Result<HashMap<UserId, u32>> {
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || -> Result<HashMap<UserId, u32>> {
            let mut quotas = HashMap::with_capacity(user_ids.len());
            for user_id in user_ids {
                let quota = backend.find_by_user(user_id)?.map_or(0, |r| r.quota);
                quotas.insert(user_id, quota);
            }
            Ok(quotas)
        })
        .await?
    }

    /// Store `quota` for `user_id`, creating the record on first write
    ///
    /// Negative quotas are stored as 0 and values past `u32::MAX` as
    /// `u32::MAX`. Returns false when the write fails, including for ids
    /// the directory does not know.
    pub async fn set(&self, user_id: UserId, quota: i64) -> bool {
        let quota = clamp_quota(quota);
        let backend = self.backend.clone();
        let directory = self.directory.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            write_quota(backend.as_ref(), directory.as_ref(), user_id, quota)
        })
        .await;

        match outcome {
            Ok(Ok(())) => {
                tracing::info!("Listings quota for user {} set to {}", user_id, quota);
                true
            }
            Ok(Err(AppError::UserNotFound)) => {
                tracing::warn!("Cannot set listings quota: unknown user {}", user_id);
                false
            }
            Ok(Err(e)) => {
                tracing::error!("Failed to store listings quota for user {}: {:?}", user_id, e);
                false
            }
            Err(e) => {
                tracing::error!("Quota write task failed for user {}: {:?}", user_id, e);
                false
            }
        }
    }
}

fn write_quota(
    backend: &dyn QuotaBackend,
    directory: &dyn UserDirectory,
    user_id: UserId,
    quota: u32,
) -> Result<()> {
    let now = Utc::now().timestamp();

    if backend.find_by_user(user_id)?.is_none() {
        let user = directory.get_user(user_id)?.ok_or(AppError::UserNotFound)?;
        if backend.insert(&QuotaRecord::new(&user, quota, now))? {
            tracing::debug!("Created listings quota record for user {}", user_id);
            return Ok(());
        }
        // Another writer created the record first
    }

    if backend.update_quota(user_id, quota, now)? {
        Ok(())
    } else {
        Err(AppError::UserNotFound)
    }
}
