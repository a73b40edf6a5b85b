use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Opaque user identifier assigned by the host platform
pub type UserId = u64;

/// Permission flags checked before quotas can be viewed or changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageOptions,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageOptions => "manage_options",
        }
    }
}

/// User record stored in redb, keyed by user id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub display_name: String,
    pub email: String,
    pub roles: Vec<String>,
}

/// User as seen by handlers and views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    pub fn from_record(id: UserId, record: UserRecord) -> Self {
        Self {
            id,
            display_name: record.display_name,
            email: record.email,
            roles: record.roles,
        }
    }

    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
        }
    }

    /// Whether any of this user's roles grants `capability`
    pub fn can(&self, capability: Capability, config: &Config) -> bool {
        let granting = config.roles_granting(capability);
        self.roles.iter().any(|role| granting.contains(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_roles(roles: &[&str]) -> Config {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            database_path: String::new(),
            environment: "test".to_string(),
            app_secret_key: "secret".to_string(),
            admin_roles: roles.iter().map(|r| r.to_string()).collect(),
            nonce_lifetime_secs: 86_400,
            report_validation_errors: false,
            users_seed_path: None,
            log_requests: false,
        }
    }

    fn user(roles: &[&str]) -> User {
        User {
            id: 7,
            display_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_capability_granted_by_role() {
        let config = config_with_roles(&["administrator"]);
        assert!(user(&["subscriber", "administrator"]).can(Capability::ManageOptions, &config));
        assert!(!user(&["subscriber"]).can(Capability::ManageOptions, &config));
        assert!(!user(&[]).can(Capability::ManageOptions, &config));
    }

    #[test]
    fn test_capability_follows_configured_roles() {
        let config = config_with_roles(&["shop_manager"]);
        assert!(user(&["shop_manager"]).can(Capability::ManageOptions, &config));
        assert!(!user(&["administrator"]).can(Capability::ManageOptions, &config));
    }

    #[test]
    fn test_user_record_serialization() {
        let original = user(&["administrator"]);
        let config = bincode::config::standard();

        let bytes = bincode::serde::encode_to_vec(original.to_record(), config).unwrap();
        let (record, _): (UserRecord, _) =
            bincode::serde::decode_from_slice(&bytes, config).unwrap();

        assert_eq!(User::from_record(7, record), original);
    }
}
