/// Name of the session cookie issued by the host platform
pub const SESSION_COOKIE: &str = "listings_session";

// =============================================================================
// Anti-forgery Actions
// =============================================================================

/// Nonce action for the management page bulk form
pub const ACTION_BULK_UPDATE: &str = "bulk_update_listings";

/// Nonce action (and AJAX action name) for the inline single-row updater
pub const ACTION_UPDATE_USER_LISTINGS: &str = "update_user_listings";

/// Nonce action for a profile save; the target user id is appended
pub fn profile_update_action(user_id: u64) -> String {
    format!("update-user_{}", user_id)
}

// =============================================================================
// Form Fields
// =============================================================================

pub const FIELD_NONCE: &str = "_nonce";
pub const FIELD_BULK_UPDATE: &str = "bulk_update";
pub const FIELD_SELECTED_USERS: &str = "selected_users[]";
pub const FIELD_BULK_COUNT: &str = "bulk_listings_count";
pub const FIELD_PROFILE_COUNT: &str = "listings_count";

// =============================================================================
// Messages
// =============================================================================

/// Generic denial for capability or token failures
pub const ERR_SECURITY_CHECK: &str = "Security check failed";

pub const MSG_SINGLE_UPDATED: &str = "Listings count updated successfully.";

pub const MSG_SINGLE_FAILED: &str = "Failed to update listings count.";

pub const ERR_BULK_MISSING_FIELDS: &str =
    "Select at least one user and enter a listings count before applying.";

pub const ERR_PROFILE_MISSING_COUNT: &str = "Listings count is required";
