//! Key-value storage operations on the `kv_store` table.
//!
//! Values are opaque strings. Writes are upserts wrapped in a database
//! transaction so a record is either fully replaced or left as it was.

use crate::{
    entities::{KvRecord, kv_record},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{debug, instrument};

/// Reads the value stored under `key`.
///
/// # Returns
/// * `Ok(Some(value))` - the key exists
/// * `Ok(None)` - nothing has been stored under this key
#[instrument(skip(db))]
pub async fn get_value<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let record = KvRecord::find_by_id(key.to_string()).one(db).await?;
    debug!(found = record.is_some(), "Read storage key");
    Ok(record.map(|r| r.value))
}

/// Stores `value` under `key`, replacing any previous value.
#[instrument(skip(db, value), fields(bytes = value.len()))]
pub async fn set_value(db: &DatabaseConnection, key: &str, value: String) -> Result<()> {
    let now = Utc::now().naive_utc();
    let txn = db.begin().await?;

    let existing = KvRecord::find_by_id(key.to_string()).one(&txn).await?;
    if let Some(record) = existing {
        let mut active_model: kv_record::ActiveModel = record.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(now);
        active_model.update(&txn).await?;
    } else {
        let record = kv_record::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
        };
        record.insert(&txn).await?;
    }

    txn.commit().await?;
    debug!("Wrote storage key");
    Ok(())
}
