use serde::{Deserialize, Serialize};

use super::user::{User, UserId};

/// Per-user listings quota stored in the `listing_quotas` table
///
/// `display_name` and `email` are copied from the user when the record is
/// first created and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRecord {
    pub user_id: UserId,
    pub quota: u32,
    pub display_name: String,
    pub email: String,
    /// Unix timestamps
    pub created_at: i64,
    pub updated_at: i64,
}

impl QuotaRecord {
    pub fn new(user: &User, quota: u32, now: i64) -> Self {
        Self {
            user_id: user.id,
            quota,
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Read the leading integer of a form value
///
/// Skips leading whitespace, honours one sign, then reads digits up to the
/// first non-digit. No digits gives 0; overflow saturates.
pub fn coerce_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    if negative { -value } else { value }
}

/// Clamp a requested quota into the stored range: negatives become 0
pub fn clamp_quota(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Coerce a form value to a user id; zero and negatives name nobody
pub fn parse_user_id(raw: &str) -> Option<UserId> {
    let value = coerce_int(raw);
    if value > 0 { Some(value as UserId) } else { None }
}
