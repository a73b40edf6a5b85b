use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::models::UserId;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// HMAC Primitives
// =============================================================================

/// Compute the hex-encoded HMAC-SHA256 of `data`
///
/// Returns an empty string (which never verifies) if the key is rejected.
pub fn sign(data: &str, secret: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return String::new();
        }
    };
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify HMAC-SHA256 signature
///
/// Comparison is constant-time. Malformed hex is rejected.
pub fn verify_hmac(data: &str, signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };

    mac.update(data.as_bytes());

    let sig_bytes = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid hex signature format");
            return false;
        }
    };

    mac.verify_slice(&sig_bytes).is_ok()
}

// =============================================================================
// Session Cookies
// =============================================================================

/// Issue a session token for `user_id` valid until `expires_at`
///
/// The host platform owns login; this is what it (and the test suite) uses
/// to mint a cookie the service will accept.
///
/// Format: `{user_id}.{expires_at}.{hex hmac}`
pub fn sign_session(user_id: UserId, expires_at: i64, secret: &str) -> String {
    let signature = sign(&session_payload(user_id, expires_at), secret);
    format!("{}.{}.{}", user_id, expires_at, signature)
}

/// Verify a session token and return the user it names
///
/// Returns `None` for malformed, forged or expired tokens.
pub fn verify_session(token: &str, secret: &str, now: i64) -> Option<UserId> {
    let mut parts = token.splitn(3, '.');
    let user_id: UserId = parts.next()?.parse().ok()?;
    let expires_at: i64 = parts.next()?.parse().ok()?;
    let signature = parts.next()?;

    if !verify_hmac(&session_payload(user_id, expires_at), signature, secret) {
        tracing::warn!("Session signature mismatch for user {}", user_id);
        return None;
    }

    if expires_at <= now {
        tracing::debug!("Session for user {} expired at {}", user_id, expires_at);
        return None;
    }

    Some(user_id)
}

fn session_payload(user_id: UserId, expires_at: i64) -> String {
    format!("session|{}|{}", user_id, expires_at)
}

// =============================================================================
// Anti-forgery Tokens (Nonces)
// =============================================================================

/// Time bucket for nonces: each token stays valid for one to two half-lifetimes
fn nonce_tick(now: i64, lifetime_secs: i64) -> i64 {
    let half = (lifetime_secs / 2).max(1);
    now.div_euclid(half) + 1
}

fn nonce_payload(tick: i64, action: &str, user_id: UserId) -> String {
    format!("nonce|{}|{}|{}", tick, action, user_id)
}

/// Create an anti-forgery token bound to an action and the acting user
pub fn create_nonce(
    action: &str,
    user_id: UserId,
    secret: &str,
    now: i64,
    lifetime_secs: i64,
) -> String {
    let tick = nonce_tick(now, lifetime_secs);
    sign(&nonce_payload(tick, action, user_id), secret)
}

/// Verify an anti-forgery token for the given action and acting user
///
/// Tokens from the current and the previous tick are accepted.
pub fn verify_nonce(
    nonce: &str,
    action: &str,
    user_id: UserId,
    secret: &str,
    now: i64,
    lifetime_secs: i64,
) -> bool {
    if nonce.is_empty() {
        return false;
    }

    let tick = nonce_tick(now, lifetime_secs);
    let valid = [tick, tick - 1]
        .iter()
        .any(|&t| verify_hmac(&nonce_payload(t, action, user_id), nonce, secret));

    if !valid {
        tracing::warn!("Nonce rejected for action '{}' (user {})", action, user_id);
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key";
    const LIFETIME: i64 = 86_400;

    // =========================================================================
    // HMAC Tests
    // =========================================================================

    #[test]
    fn test_verify_hmac_valid() {
        let signature = sign("test data", SECRET);
        assert!(verify_hmac("test data", &signature, SECRET));
    }

    #[test]
    fn test_verify_hmac_invalid_signature() {
        let wrong_signature = "0".repeat(64);
        assert!(!verify_hmac("test data", &wrong_signature, SECRET));
    }

    #[test]
    fn test_verify_hmac_wrong_secret() {
        let signature = sign("test data", SECRET);
        assert!(!verify_hmac("test data", &signature, "wrong-secret"));
    }

    #[test]
    fn test_verify_hmac_rejects_non_hex() {
        assert!(!verify_hmac("test data", "not-hex!", SECRET));
    }

    // =========================================================================
    // Session Tests
    // =========================================================================

    #[test]
    fn test_session_round_trip() {
        let token = sign_session(42, 2_000, SECRET);
        assert_eq!(verify_session(&token, SECRET, 1_000), Some(42));
    }

    #[test]
    fn test_session_expired() {
        let token = sign_session(42, 2_000, SECRET);
        assert_eq!(verify_session(&token, SECRET, 2_000), None);
    }

    #[test]
    fn test_session_tampered_user() {
        let token = sign_session(42, 2_000, SECRET);
        let forged = token.replacen("42.", "1.", 1);
        assert_eq!(verify_session(&forged, SECRET, 1_000), None);
    }

    #[test]
    fn test_session_malformed() {
        assert_eq!(verify_session("", SECRET, 0), None);
        assert_eq!(verify_session("42", SECRET, 0), None);
        assert_eq!(verify_session("abc.def.ghi", SECRET, 0), None);
    }

    // =========================================================================
    // Nonce Tests
    // =========================================================================

    #[test]
    fn test_nonce_valid_for_same_action_and_user() {
        let now = 1_700_000_000;
        let nonce = create_nonce("bulk_update_listings", 1, SECRET, now, LIFETIME);
        assert!(verify_nonce(&nonce, "bulk_update_listings", 1, SECRET, now, LIFETIME));
    }

    #[test]
    fn test_nonce_bound_to_action() {
        let now = 1_700_000_000;
        let nonce = create_nonce("bulk_update_listings", 1, SECRET, now, LIFETIME);
        assert!(!verify_nonce(&nonce, "update_user_listings", 1, SECRET, now, LIFETIME));
    }

    #[test]
    fn test_nonce_bound_to_user() {
        let now = 1_700_000_000;
        let nonce = create_nonce("update_user_listings", 1, SECRET, now, LIFETIME);
        assert!(!verify_nonce(&nonce, "update_user_listings", 2, SECRET, now, LIFETIME));
    }

    #[test]
    fn test_nonce_survives_one_tick_then_expires() {
        let now = 1_700_000_000;
        let nonce = create_nonce("update_user_listings", 1, SECRET, now, LIFETIME);

        let next_tick = now + LIFETIME / 2;
        assert!(verify_nonce(&nonce, "update_user_listings", 1, SECRET, next_tick, LIFETIME));

        let two_ticks = now + LIFETIME;
        assert!(!verify_nonce(&nonce, "update_user_listings", 1, SECRET, two_ticks, LIFETIME));
    }

    #[test]
    fn test_nonce_empty_rejected() {
        assert!(!verify_nonce("", "update_user_listings", 1, SECRET, 0, LIFETIME));
    }
}
