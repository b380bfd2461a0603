//! Persistence contract used by the policy routes.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StateResult;
use crate::store::StateStore;
use crate::types::PolicyRecord;

/// Storage operations the policy routes depend on.
///
/// Implementations own uniqueness of `app_id`. The upsert route issues a
/// `find_or_create` and, if the record already existed, an `update`; it
/// adds no locking or rollback of its own.
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Return the record for `app_id`, inserting `defaults` if none exists.
    ///
    /// The flag is `true` when `defaults` was inserted.
    async fn find_or_create(
        &self,
        app_id: &str,
        defaults: PolicyRecord,
    ) -> StateResult<(PolicyRecord, bool)>;

    /// Replace `policy_json` on every record matching `app_id` and return
    /// the updated rows.
    async fn update(&self, app_id: &str, policy_json: Value) -> StateResult<Vec<PolicyRecord>>;

    /// Look up the record for `app_id`.
    async fn get(&self, app_id: &str) -> StateResult<Option<PolicyRecord>>;

    /// All stored records, ordered by `app_id`.
    async fn list(&self) -> StateResult<Vec<PolicyRecord>>;

    /// Identifiers of every application that has a policy.
    async fn app_ids(&self) -> StateResult<BTreeSet<String>>;
}

#[async_trait]
impl PolicyRepository for StateStore {
    async fn find_or_create(
        &self,
        app_id: &str,
        defaults: PolicyRecord,
    ) -> StateResult<(PolicyRecord, bool)> {
        self.find_or_create_policy(app_id, &defaults)
    }

    async fn update(&self, app_id: &str, policy_json: Value) -> StateResult<Vec<PolicyRecord>> {
        self.update_policy(app_id, &policy_json)
    }

    async fn get(&self, app_id: &str) -> StateResult<Option<PolicyRecord>> {
        self.get_policy(app_id)
    }

    async fn list(&self) -> StateResult<Vec<PolicyRecord>> {
        self.list_policies()
    }

    async fn app_ids(&self) -> StateResult<BTreeSet<String>> {
        StateStore::app_ids(self)
    }
}
