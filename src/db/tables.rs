use redb::TableDefinition;

/// Quotas table: user_id -> QuotaRecord (serialized)
pub const QUOTAS: TableDefinition<u64, &[u8]> = TableDefinition::new("listing_quotas");

/// Users table: user_id -> UserRecord (serialized)
/// Mirror of the host directory, filled from the seed file at start-up
pub const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");
