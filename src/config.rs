use std::env;

use crate::models::Capability;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub environment: String,
    /// Shared with the host platform: signs session cookies and anti-forgery tokens
    pub app_secret_key: String,
    /// Roles that grant the `manage_options` capability
    pub admin_roles: Vec<String>,
    pub nonce_lifetime_secs: i64,
    /// When false, missing or malformed form input is skipped without a message
    pub report_validation_errors: bool,
    pub users_seed_path: Option<String>,
    pub log_requests: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/listings.db".to_string());

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let app_secret_key = env::var("APP_SECRET_KEY")
            .map_err(|_| "APP_SECRET_KEY must be set for session and nonce verification")?;

        let admin_roles = parse_list(
            &env::var("ADMIN_ROLES").unwrap_or_else(|_| "administrator".to_string()),
        );

        let nonce_lifetime_secs: i64 = env::var("NONCE_LIFETIME_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .map_err(|_| "Invalid NONCE_LIFETIME_SECS")?;
        if nonce_lifetime_secs < 2 {
            return Err("NONCE_LIFETIME_SECS must be at least 2".to_string());
        }

        let report_validation_errors = parse_bool("REPORT_VALIDATION_ERRORS", false)?;
        let log_requests = parse_bool("LOG_REQUESTS", true)?;

        let users_seed_path = env::var("USERS_SEED_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty());

        Ok(Config {
            server_host,
            server_port,
            database_path,
            environment,
            app_secret_key,
            admin_roles,
            nonce_lifetime_secs,
            report_validation_errors,
            users_seed_path,
            log_requests,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Roles that carry the given capability
    pub fn roles_granting(&self, capability: Capability) -> &[String] {
        match capability {
            Capability::ManageOptions => &self.admin_roles,
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(name: &str, default: bool) -> Result<bool, String> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("Invalid {}", name)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_trims_and_skips_empty() {
        assert_eq!(
            parse_list(" administrator, shop_manager ,,"),
            vec!["administrator".to_string(), "shop_manager".to_string()]
        );
        assert!(parse_list("").is_empty());
    }
}
