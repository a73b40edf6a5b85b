use redb::{ReadableDatabase, ReadableTable};

use super::QuotaBackend;
use crate::db::{BINCODE_CONFIG, Db, tables};
use crate::error::Result;
use crate::models::{QuotaRecord, UserId};

/// Quota storage in the dedicated `listing_quotas` redb table
#[derive(Clone)]
pub struct RedbQuotaBackend {
    db: Db,
}

impl RedbQuotaBackend {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

fn decode(bytes: &[u8]) -> Result<QuotaRecord> {
    let (record, _): (QuotaRecord, usize) =
        bincode::serde::decode_from_slice(bytes, BINCODE_CONFIG)?;
    Ok(record)
}

impl QuotaBackend for RedbQuotaBackend {
    fn find_by_user(&self, user_id: UserId) -> Result<Option<QuotaRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(tables::QUOTAS)?;

        match table.get(user_id)? {
            Some(bytes) => Ok(Some(decode(bytes.value())?)),
            None => Ok(None),
        }
    }

    fn insert(&self, record: &QuotaRecord) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(tables::QUOTAS)?;

            // Never overwrite: the caller falls back to an update
            if table.get(record.user_id)?.is_some() {
                return Ok(false);
            }

            let bytes = bincode::serde::encode_to_vec(record, BINCODE_CONFIG)?;
            table.insert(record.user_id, bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(true)
    }

    fn update_quota(&self, user_id: UserId, quota: u32, updated_at: i64) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(tables::QUOTAS)?;

            let existing = match table.get(user_id)? {
                Some(bytes) => Some(decode(bytes.value())?),
                None => None,
            };
            let Some(mut record) = existing else {
                return Ok(false);
            };

            record.quota = quota;
            record.updated_at = updated_at;
            let bytes = bincode::serde::encode_to_vec(&record, BINCODE_CONFIG)?;
            table.insert(user_id, bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(true)
    }
}
