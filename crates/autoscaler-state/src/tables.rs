//! redb table definitions for the policy store.

use redb::TableDefinition;

/// Policy records keyed by `{app_id}`.
pub const POLICIES: TableDefinition<&str, &[u8]> = TableDefinition::new("policy_json");
