//! Domain types for the policy store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of the application a policy belongs to.
pub type AppId = String;

/// The stored autoscaling policy for one application.
///
/// `policy_json` is kept as an opaque document; no schema is enforced
/// here or by the upsert route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyRecord {
    pub app_id: AppId,
    pub policy_json: Value,
}

impl PolicyRecord {
    pub fn new(app_id: impl Into<AppId>, policy_json: Value) -> Self {
        Self {
            app_id: app_id.into(),
            policy_json,
        }
    }

    /// Key under which this record is stored.
    pub fn table_key(&self) -> &str {
        &self.app_id
    }
}
