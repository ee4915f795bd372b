//! Entity module - SeaORM entity definitions for the storage database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod kv_record;

pub use kv_record::{Entity as KvRecord, Model as KvRecordModel};
