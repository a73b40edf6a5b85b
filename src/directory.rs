//! Read-only view of the host platform's user directory.
//!
//! The host owns users. This service keeps a mirror in the `users` table,
//! populated from a JSON seed file at start-up, and only ever reads it while
//! serving requests.

use redb::{ReadableDatabase, ReadableTable};
use std::path::Path;

use crate::db::{BINCODE_CONFIG, Db, tables};
use crate::error::Result;
use crate::models::{User, UserId, UserRecord};

/// User lookup boundary
pub trait UserDirectory: Send + Sync {
    fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Every user, ordered by id
    fn list_users(&self) -> Result<Vec<User>>;
}

/// Directory backed by the redb `users` table
#[derive(Clone)]
pub struct RedbUserDirectory {
    db: Db,
}

impl RedbUserDirectory {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert or replace users in a single transaction
    pub fn import(&self, users: &[User]) -> Result<usize> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(tables::USERS)?;
            for user in users {
                let bytes = bincode::serde::encode_to_vec(user.to_record(), BINCODE_CONFIG)?;
                table.insert(user.id, bytes.as_slice())?;
            }
        }
        write_txn.commit()?;

        tracing::info!("Imported {} users into directory", users.len());
        Ok(users.len())
    }
}

impl UserDirectory for RedbUserDirectory {
    fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(tables::USERS)?;

        let Some(bytes) = table.get(id)? else {
            return Ok(None);
        };
        let (record, _): (UserRecord, usize) =
            bincode::serde::decode_from_slice(bytes.value(), BINCODE_CONFIG)?;

        Ok(Some(User::from_record(id, record)))
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(tables::USERS)?;

        let mut users = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let (record, _): (UserRecord, usize) =
                bincode::serde::decode_from_slice(value.value(), BINCODE_CONFIG)?;
            users.push(User::from_record(key.value(), record));
        }

        Ok(users)
    }
}

/// Read a JSON array of users (`[{id, display_name, email, roles}]`)
pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<User>> {
    let data = std::fs::read_to_string(path.as_ref())?;
    let users: Vec<User> = serde_json::from_str(&data)?;
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_database;
    use tempfile::TempDir;

    fn user(id: UserId, name: &str) -> User {
        User {
            id,
            display_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            roles: vec!["subscriber".to_string()],
        }
    }

    #[test]
    fn test_get_missing_user() {
        let temp_dir = TempDir::new().unwrap();
        let db = open_database(temp_dir.path().join("test.db")).unwrap();
        let directory = RedbUserDirectory::new(db);

        assert_eq!(directory.get_user(99).unwrap(), None);
    }

    #[test]
    fn test_import_then_list_in_id_order() {
        let temp_dir = TempDir::new().unwrap();
        let db = open_database(temp_dir.path().join("test.db")).unwrap();
        let directory = RedbUserDirectory::new(db);

        directory
            .import(&[user(3, "Carol"), user(1, "Alice"), user(2, "Bob")])
            .unwrap();

        let ids: Vec<UserId> = directory.list_users().unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(directory.get_user(2).unwrap(), Some(user(2, "Bob")));
    }

    #[test]
    fn test_import_replaces_existing_user() {
        let temp_dir = TempDir::new().unwrap();
        let db = open_database(temp_dir.path().join("test.db")).unwrap();
        let directory = RedbUserDirectory::new(db);

        directory.import(&[user(1, "Alice")]).unwrap();
        directory.import(&[user(1, "Alicia")]).unwrap();

        assert_eq!(directory.list_users().unwrap().len(), 1);
        assert_eq!(directory.get_user(1).unwrap().unwrap().display_name, "Alicia");
    }

    #[test]
    fn test_load_seed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"[{"id": 1, "display_name": "Admin", "email": "admin@example.com", "roles": ["administrator"]},
                {"id": 2, "display_name": "Vendor", "email": "vendor@example.com"}]"#,
        )
        .unwrap();

        let users = load_seed_file(&path).unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].roles, vec!["administrator".to_string()]);
        assert!(users[1].roles.is_empty());
    }

    #[test]
    fn test_load_seed_file_rejects_bad_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("users.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(load_seed_file(&path).is_err());
    }
}
