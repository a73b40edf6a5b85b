use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use chrono::Utc;

use crate::AppState;
use crate::constants::SESSION_COOKIE;
use crate::error::{AppError, Result};
use crate::models::{Capability, User};
use crate::security::{create_nonce, verify_nonce, verify_session};

/// The signed-in user making the request
///
/// Resolved from the host-issued session cookie. Requests without a valid
/// session are rejected with 401 before any handler runs.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user: User,
}

impl Viewer {
    pub fn can(&self, capability: Capability, state: &AppState) -> bool {
        self.user.can(capability, &state.config)
    }

    /// Fail with the generic security denial unless the viewer holds `capability`
    pub fn require(&self, capability: Capability, state: &AppState) -> Result<()> {
        if self.can(capability, state) {
            Ok(())
        } else {
            tracing::warn!(
                "User {} lacks capability '{}'",
                self.user.id,
                capability.as_str()
            );
            Err(AppError::Forbidden)
        }
    }

    /// Anti-forgery token for `action`, bound to this viewer
    pub fn nonce(&self, action: &str, state: &AppState) -> String {
        create_nonce(
            action,
            self.user.id,
            &state.config.app_secret_key,
            Utc::now().timestamp(),
            state.config.nonce_lifetime_secs,
        )
    }

    pub fn verify_nonce(&self, nonce: &str, action: &str, state: &AppState) -> bool {
        verify_nonce(
            nonce,
            action,
            self.user.id,
            &state.config.app_secret_key,
            Utc::now().timestamp(),
            state.config.nonce_lifetime_secs,
        )
    }
}

/// Value of the session cookie, if the request carries one
fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = session_cookie(&parts.headers).ok_or(AppError::Unauthorized)?;

        let user_id = verify_session(
            token,
            &state.config.app_secret_key,
            Utc::now().timestamp(),
        )
        .ok_or(AppError::Unauthorized)?;

        let user = super::lookup_user(state, user_id).await?.ok_or_else(|| {
            tracing::warn!("Session names unknown user {}", user_id);
            AppError::Unauthorized
        })?;

        Ok(Viewer { user })
    }
}
