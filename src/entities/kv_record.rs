//! Key-value record entity - durable storage for serialized journal state.
//!
//! The whole journal lives in a single row keyed by the configured storage key.
//! Keeping the table generic leaves room for more than one journal (or backups)
//! in the same database file.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key-value database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kv_store")]
pub struct Model {
    /// Storage key (e.g. `"igrow_app_data_v1"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Serialized value
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this record was last written
    pub updated_at: DateTime,
}

/// `KvRecord` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
