//! StateStore — redb-backed policy persistence.
//!
//! Policy records are JSON-serialized into redb's `&[u8]` value column,
//! keyed by `app_id`. The store supports both on-disk and in-memory
//! backends (the latter for testing).

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use serde_json::Value;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::POLICIES;
use crate::types::PolicyRecord;

macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

fn decode(bytes: &[u8]) -> StateResult<PolicyRecord> {
    serde_json::from_slice(bytes).map_err(map_err!(Deserialize))
}

/// Policy store over a shared redb handle. Cheap to clone.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open `path`, creating the database file and policy table as needed.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        debug!(?path, "policy store opened");
        Self::with_policy_table(db)
    }

    /// Policies live only as long as the returned store and its clones.
    pub fn open_in_memory() -> StateResult<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(map_err!(Open))?;
        debug!("in-memory policy store opened");
        Self::with_policy_table(db)
    }

    fn with_policy_table(db: Database) -> StateResult<Self> {
        let txn = db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(POLICIES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Return the policy for `app_id`, inserting `defaults` if there is none.
    ///
    /// `defaults` must carry the same `app_id`; otherwise nothing is read
    /// or written and `KeyMismatch` is returned.
    ///
    /// Lookup and insert share one write transaction. redb admits a single
    /// writer at a time, so two concurrent calls for the same `app_id` can
    /// never both report `created`.
    pub fn find_or_create_policy(
        &self,
        app_id: &str,
        defaults: &PolicyRecord,
    ) -> StateResult<(PolicyRecord, bool)> {
        if defaults.table_key() != app_id {
            return Err(StateError::KeyMismatch {
                key: app_id.to_string(),
                record: defaults.app_id.clone(),
            });
        }

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let mut table = txn.open_table(POLICIES).map_err(map_err!(Table))?;

        let existing = table
            .get(app_id)
            .map_err(map_err!(Read))?
            .map(|guard| decode(guard.value()))
            .transpose()?;

        if let Some(record) = existing {
            drop(table);
            txn.abort().map_err(map_err!(Transaction))?;
            debug!(%app_id, "policy found");
            return Ok((record, false));
        }

        let value = serde_json::to_vec(defaults).map_err(map_err!(Serialize))?;
        table
            .insert(defaults.table_key(), value.as_slice())
            .map_err(map_err!(Write))?;
        drop(table);
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%app_id, "policy created");
        Ok((defaults.clone(), true))
    }

    /// Replace the policy document of the record keyed by `app_id`.
    ///
    /// Returns the updated rows: one record, or none when no policy is
    /// stored for `app_id`. A missing record is left missing.
    pub fn update_policy(&self, app_id: &str, policy_json: &Value) -> StateResult<Vec<PolicyRecord>> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let mut table = txn.open_table(POLICIES).map_err(map_err!(Table))?;

        let exists = table.get(app_id).map_err(map_err!(Read))?.is_some();
        if !exists {
            drop(table);
            txn.abort().map_err(map_err!(Transaction))?;
            debug!(%app_id, "no policy to update");
            return Ok(Vec::new());
        }

        let record = PolicyRecord::new(app_id, policy_json.clone());
        let value = serde_json::to_vec(&record).map_err(map_err!(Serialize))?;
        table
            .insert(app_id, value.as_slice())
            .map_err(map_err!(Write))?;
        drop(table);
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%app_id, "policy updated");
        Ok(vec![record])
    }

    /// Get the policy for an application.
    pub fn get_policy(&self, app_id: &str) -> StateResult<Option<PolicyRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(POLICIES).map_err(map_err!(Table))?;
        let record = table
            .get(app_id)
            .map_err(map_err!(Read))?
            .map(|guard| decode(guard.value()))
            .transpose()?;
        Ok(record)
    }

    /// List all stored policies, ordered by `app_id`.
    pub fn list_policies(&self) -> StateResult<Vec<PolicyRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(POLICIES).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            results.push(decode(value.value())?);
        }
        Ok(results)
    }

    /// Identifiers of every application that has a policy.
    pub fn app_ids(&self) -> StateResult<BTreeSet<String>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(POLICIES).map_err(map_err!(Table))?;
        let mut ids = BTreeSet::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, _) = entry.map_err(map_err!(Read))?;
            ids.insert(key.value().to_string());
        }
        Ok(ids)
    }
}
