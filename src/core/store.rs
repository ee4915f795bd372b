//! Persistent journal store - the single owner of [`AppData`].
//!
//! The store loads the aggregate once at startup and mediates every change.
//! A mutation computes the next aggregate from the current one, writes the
//! whole thing to storage, and only then replaces the in-memory copy. If the
//! write fails the store keeps its previous state, so memory and storage never
//! disagree.
//!
//! Construct one store at startup and pass it by reference; there is no global
//! instance.

use crate::{
    core::storage,
    errors::{Error, Result},
    models::{Activity, AppData, GrowthPhase, Plant, Product},
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument, warn};

/// Owns the journal aggregate and keeps it in sync with storage.
#[derive(Debug)]
pub struct JournalStore {
    db: DatabaseConnection,
    key: String,
    data: AppData,
}

impl JournalStore {
    /// Opens the journal stored under `key`.
    ///
    /// With no stored record the store starts from [`AppData::seed`] (or an
    /// empty aggregate when `seed_on_first_run` is false) and persists it. A
    /// record that fails to deserialize is copied to `<key>.corrupt` and
    /// replaced the same way; this is logged, not returned as an error.
    ///
    /// # Errors
    /// Returns an error only if storage itself cannot be read or written.
    pub async fn open(
        db: DatabaseConnection,
        key: impl Into<String>,
        seed_on_first_run: bool,
    ) -> Result<Self> {
        Self::open_at(db, key, seed_on_first_run, Utc::now()).await
    }

    /// Same as [`JournalStore::open`], seeding relative to `now`.
    #[instrument(skip(db, key), fields(storage_key))]
    pub async fn open_at(
        db: DatabaseConnection,
        key: impl Into<String>,
        seed_on_first_run: bool,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let key = key.into();
        tracing::Span::current().record("storage_key", key.as_str());

        let initial = || {
            if seed_on_first_run {
                AppData::seed(now)
            } else {
                AppData::default()
            }
        };

        let loaded = match storage::get_value(&db, &key).await? {
            Some(text) => match serde_json::from_str::<AppData>(&text) {
                Ok(data) => Some(data),
                Err(e) => {
                    warn!("Stored journal is unreadable ({e}), starting from defaults");
                    storage::set_value(&db, &format!("{key}.corrupt"), text).await?;
                    None
                }
            },
            None => {
                info!("No stored journal found, starting from defaults");
                None
            }
        };

        let mut store = Self {
            db,
            key,
            data: AppData::default(),
        };
        match loaded {
            Some(data) => store.data = data,
            None => store.commit(initial()).await?,
        }

        info!(
            plants = store.data.plants.len(),
            activities = store.data.activities.len(),
            products = store.data.products.len(),
            "Journal loaded"
        );
        Ok(store)
    }

    /// Current aggregate.
    #[must_use]
    pub const fn data(&self) -> &AppData {
        &self.data
    }

    /// All plants in insertion order.
    #[must_use]
    pub fn plants(&self) -> &[Plant] {
        &self.data.plants
    }

    /// All activities, newest insertion first.
    #[must_use]
    pub fn activities(&self) -> &[Activity] {
        &self.data.activities
    }

    /// The product catalogue.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.data.products
    }

    /// Looks up a plant by id.
    #[must_use]
    pub fn plant(&self, id: &str) -> Option<&Plant> {
        self.data.plant(id)
    }

    /// Looks up a product by id.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.data.product(id)
    }

    /// Storage key this journal is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Appends a plant.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateId`] if a plant with the same id exists.
    #[instrument(skip(self, plant), fields(plant_id = %plant.id))]
    pub async fn add_plant(&mut self, plant: Plant) -> Result<()> {
        if self.data.plant(&plant.id).is_some() {
            return Err(Error::DuplicateId {
                kind: "plant",
                id: plant.id,
            });
        }
        let next = self.data.with_plant_added(plant);
        self.commit(next).await
    }

    /// Replaces the plant with the same id. Returns `false` without writing
    /// anything if no such plant exists.
    #[instrument(skip(self, plant), fields(plant_id = %plant.id))]
    pub async fn update_plant(&mut self, plant: Plant) -> Result<bool> {
        let Some(next) = self.data.with_plant_updated(plant) else {
            debug!("Plant not found, nothing updated");
            return Ok(false);
        };
        self.commit(next).await?;
        Ok(true)
    }

    /// Moves a plant to `phase`. Any transition is allowed.
    pub async fn set_plant_phase(&mut self, id: &str, phase: GrowthPhase) -> Result<bool> {
        let Some(updated) = self.data.plant(id).map(|p| p.with_phase(phase)) else {
            return Ok(false);
        };
        self.update_plant(updated).await
    }

    /// Removes a plant and every activity logged against it.
    #[instrument(skip(self))]
    pub async fn delete_plant(&mut self, id: &str) -> Result<bool> {
        let Some(next) = self.data.with_plant_removed(id) else {
            debug!("Plant not found, nothing deleted");
            return Ok(false);
        };
        let removed_activities = self.data.activities.len() - next.activities.len();
        self.commit(next).await?;
        info!(removed_activities, "Plant deleted");
        Ok(true)
    }

    /// Inserts an activity at the front of the activity list.
    ///
    /// The owning plant is not required to exist.
    ///
    /// # Errors
    /// Returns [`Error::InvalidMeasurement`] for a negative or non-finite
    /// reading or dose, and [`Error::DuplicateId`] if the id is taken.
    #[instrument(skip(self, activity), fields(activity_id = %activity.id, plant_id = %activity.plant_id))]
    pub async fn add_activity(&mut self, activity: Activity) -> Result<()> {
        activity.validate()?;
        if self.data.activity(&activity.id).is_some() {
            return Err(Error::DuplicateId {
                kind: "activity",
                id: activity.id,
            });
        }
        if self.data.plant(&activity.plant_id).is_none() {
            debug!("Activity references an unknown plant");
        }
        let next = self.data.with_activity_added(activity);
        self.commit(next).await
    }

    /// Removes one activity.
    #[instrument(skip(self))]
    pub async fn delete_activity(&mut self, id: &str) -> Result<bool> {
        let Some(next) = self.data.with_activity_removed(id) else {
            debug!("Activity not found, nothing deleted");
            return Ok(false);
        };
        self.commit(next).await?;
        Ok(true)
    }

    /// Appends a product to the catalogue.
    ///
    /// # Errors
    /// Returns [`Error::InvalidMeasurement`] for a bad stock level and
    /// [`Error::DuplicateId`] if the id is taken.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_product(&mut self, product: Product) -> Result<()> {
        product.validate()?;
        if self.data.product(&product.id).is_some() {
            return Err(Error::DuplicateId {
                kind: "product",
                id: product.id,
            });
        }
        let next = self.data.with_product_added(product);
        self.commit(next).await
    }

    /// Removes a product. Activities that used it keep their (now dangling)
    /// usages.
    #[instrument(skip(self))]
    pub async fn delete_product(&mut self, id: &str) -> Result<bool> {
        let Some(next) = self.data.with_product_removed(id) else {
            debug!("Product not found, nothing deleted");
            return Ok(false);
        };
        self.commit(next).await?;
        Ok(true)
    }

    /// Replaces the whole journal.
    ///
    /// # Errors
    /// Returns [`Error::InvalidImport`] if `data` fails [`AppData::validate`];
    /// the current journal is left untouched.
    #[instrument(skip(self, data))]
    pub async fn import_data(&mut self, data: AppData) -> Result<()> {
        data.validate()?;
        info!(
            plants = data.plants.len(),
            activities = data.activities.len(),
            products = data.products.len(),
            "Importing journal"
        );
        self.commit(data).await
    }

    /// Parses a JSON backup and imports it.
    pub async fn import_json(&mut self, text: &str) -> Result<()> {
        let data: AppData = serde_json::from_str(text).map_err(|e| Error::InvalidImport {
            message: format!("not a journal backup: {e}"),
        })?;
        self.import_data(data).await
    }

    /// Serializes the journal as pretty-printed JSON in the persisted layout.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.data).map_err(Into::into)
    }

    /// Persists `next` and makes it the current state.
    async fn commit(&mut self, next: AppData) -> Result<()> {
        let serialized = serde_json::to_string(&next)?;
        storage::set_value(&self.db, &self.key, serialized).await?;
        self.data = next;
        Ok(())
    }
}
