pub mod quota;
pub mod user;

pub use quota::{QuotaRecord, clamp_quota, coerce_int, parse_user_id};
pub use user::{Capability, User, UserId, UserRecord};
