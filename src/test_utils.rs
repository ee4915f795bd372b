//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database and building test records with
//! sensible defaults.

use crate::{
    core::{JournalStore, storage},
    errors::Result,
    models::{Activity, ActivityType, AppData, Plant, Product},
};
use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;

/// Storage key used by every test store.
pub const TEST_KEY: &str = "test_journal";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Opens a seeded store on a fresh in-memory database.
pub async fn open_test_store() -> Result<JournalStore> {
    let db = setup_test_db().await?;
    JournalStore::open(db, TEST_KEY, true).await
}

/// Reads back and deserializes what the store last persisted.
pub async fn stored_data(store: &JournalStore) -> Result<AppData> {
    let text = storage::get_value(store.connection(), store.key())
        .await?
        .unwrap_or_default();
    Ok(serde_json::from_str(&text)?)
}

/// Creates a test plant started 10 days ago.
pub fn create_test_plant(name: &str) -> Plant {
    Plant::new(name, "Test Strain", Utc::now() - Duration::days(10))
}

/// Creates a test activity dated now with no measurements.
pub fn create_test_activity(plant_id: &str, activity_type: ActivityType) -> Activity {
    Activity::new(plant_id, activity_type, Utc::now())
}

/// Creates a test product with default brand and NPK.
pub fn create_test_product(name: &str) -> Product {
    Product::new(name, "Test Brand", "1-1-1")
}
