//! The aggregate root persisted as one record.
//!
//! Every mutation is expressed as a pure function from the current aggregate to
//! a new one. The store persists the result and only then swaps it in, so a
//! reader never sees a half-applied change.

use super::{Activity, GrowthPhase, Plant, Product};
use crate::errors::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Age of the seed plant relative to the moment the journal is first opened.
const SEED_PLANT_AGE_DAYS: i64 = 30;

/// All journal state: plants, activities (newest first) and products.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    /// Plants in insertion order
    #[serde(default)]
    pub plants: Vec<Plant>,
    /// Activities, most recent insertion first
    #[serde(default)]
    pub activities: Vec<Activity>,
    /// Product catalogue in insertion order
    #[serde(default)]
    pub products: Vec<Product>,
}

impl AppData {
    /// Default dataset used when no journal has been stored yet.
    ///
    /// This is example content, not user data: one plant started 30 days
    /// before `now` and two products. The result depends only on `now`.
    #[must_use]
    pub fn seed(now: DateTime<Utc>) -> Self {
        let product = |id: &str, name: &str, npk: &str| Product {
            id: id.to_string(),
            name: name.to_string(),
            product_type: Product::DEFAULT_TYPE.to_string(),
            npk: npk.to_string(),
            brand: "Advanced Nutrients".to_string(),
            stock_level: None,
        };

        Self {
            plants: vec![Plant {
                id: "1".to_string(),
                name: "White Widow #1".to_string(),
                strain: "White Widow (Auto)".to_string(),
                start_date: now - Duration::days(SEED_PLANT_AGE_DAYS),
                photo_url: super::placeholder_photo_url("plant1"),
                current_phase: GrowthPhase::Vegetative,
            }],
            activities: Vec::new(),
            products: vec![
                product("p1", "Grow A", "3-0-1"),
                product("p2", "Grow B", "1-0-4"),
            ],
        }
    }

    /// Looks up a plant by id.
    #[must_use]
    pub fn plant(&self, id: &str) -> Option<&Plant> {
        self.plants.iter().find(|p| p.id == id)
    }

    /// Looks up an activity by id.
    #[must_use]
    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    /// Looks up a product by id. Dangling references resolve to `None`.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// New aggregate with `plant` appended.
    #[must_use]
    pub fn with_plant_added(&self, plant: Plant) -> Self {
        let mut next = self.clone();
        next.plants.push(plant);
        next
    }

    /// New aggregate with the plant of the same id replaced, or `None` if no
    /// such plant exists.
    #[must_use]
    pub fn with_plant_updated(&self, plant: Plant) -> Option<Self> {
        let index = self.plants.iter().position(|p| p.id == plant.id)?;
        let mut next = self.clone();
        next.plants[index] = plant;
        Some(next)
    }

    /// New aggregate without the plant and without any activity logged
    /// against it, or `None` if no such plant exists.
    #[must_use]
    pub fn with_plant_removed(&self, id: &str) -> Option<Self> {
        self.plant(id)?;
        Some(Self {
            plants: self.plants.iter().filter(|p| p.id != id).cloned().collect(),
            activities: self
                .activities
                .iter()
                .filter(|a| a.plant_id != id)
                .cloned()
                .collect(),
            products: self.products.clone(),
        })
    }

    /// New aggregate with `activity` at the front of the activity list.
    #[must_use]
    pub fn with_activity_added(&self, activity: Activity) -> Self {
        let mut activities = Vec::with_capacity(self.activities.len() + 1);
        activities.push(activity);
        activities.extend(self.activities.iter().cloned());
        Self {
            activities,
            ..self.clone()
        }
    }

    /// New aggregate without the activity, or `None` if it does not exist.
    #[must_use]
    pub fn with_activity_removed(&self, id: &str) -> Option<Self> {
        self.activity(id)?;
        let mut next = self.clone();
        next.activities.retain(|a| a.id != id);
        Some(next)
    }

    /// New aggregate with `product` appended.
    #[must_use]
    pub fn with_product_added(&self, product: Product) -> Self {
        let mut next = self.clone();
        next.products.push(product);
        next
    }

    /// New aggregate without the product, or `None` if it does not exist.
    ///
    /// Activities keep their usages of the product; those references dangle.
    #[must_use]
    pub fn with_product_removed(&self, id: &str) -> Option<Self> {
        self.product(id)?;
        let mut next = self.clone();
        next.products.retain(|p| p.id != id);
        Some(next)
    }

    /// Structural checks applied to an imported aggregate: ids are non-empty
    /// and unique within each collection, and every number is finite and
    /// non-negative.
    ///
    /// Activities pointing at unknown plants and usages pointing at unknown
    /// products are accepted; readers treat them as absent.
    pub fn validate(&self) -> Result<()> {
        check_ids("plant", self.plants.iter().map(|p| p.id.as_str()))?;
        check_ids("activity", self.activities.iter().map(|a| a.id.as_str()))?;
        check_ids("product", self.products.iter().map(|p| p.id.as_str()))?;

        for activity in &self.activities {
            activity.validate().map_err(|e| Error::InvalidImport {
                message: format!("activity {}: {e}", activity.id),
            })?;
        }
        for product in &self.products {
            product.validate().map_err(|e| Error::InvalidImport {
                message: format!("product {}: {e}", product.id),
            })?;
        }
        Ok(())
    }
}

fn check_ids<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(Error::InvalidImport {
                message: format!("{kind} with empty id"),
            });
        }
        if !seen.insert(id) {
            return Err(Error::InvalidImport {
                message: format!("duplicate {kind} id '{id}'"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::{ActivityType, ProductUsage};

    fn sample() -> AppData {
        let now = Utc::now();
        let mut data = AppData::seed(now);
        let second = Plant::new("Northern Lights", "NL #5", now);
        let first_id = data.plants[0].id.clone();
        let second_id = second.id.clone();
        data = data.with_plant_added(second);
        for (plant_id, kind) in [
            (&first_id, ActivityType::Watering),
            (&second_id, ActivityType::Topping),
            (&first_id, ActivityType::Fertilization),
        ] {
            data = data.with_activity_added(Activity::new(plant_id.clone(), kind, now));
        }
        data
    }

    #[test]
    fn test_seed_is_deterministic_for_a_given_instant() {
        let now = Utc::now();
        let seed = AppData::seed(now);
        assert_eq!(seed, AppData::seed(now));
        assert_eq!(seed.plants.len(), 1);
        assert_eq!(seed.products.len(), 2);
        assert!(seed.activities.is_empty());
        assert_eq!(seed.plants[0].start_date, now - Duration::days(30));
        assert!(seed.validate().is_ok());
    }

    #[test]
    fn test_activity_added_at_front() {
        let data = sample();
        let activity = Activity::new("1", ActivityType::Lst, Utc::now());
        let next = data.with_activity_added(activity.clone());
        assert_eq!(next.activities[0], activity);
        assert_eq!(next.activities[1..], data.activities[..]);
    }

    #[test]
    fn test_plant_removal_cascades_to_its_activities_only() {
        let data = sample();
        let next = data.with_plant_removed("1").unwrap();
        let expected: Vec<Activity> = data
            .activities
            .iter()
            .filter(|a| a.plant_id != "1")
            .cloned()
            .collect();
        assert_eq!(next.activities, expected);
        assert_eq!(next.activities.len(), 1);
        assert!(next.plant("1").is_none());
        assert_eq!(next.products, data.products);
    }

    #[test]
    fn test_product_removal_leaves_activities_untouched() {
        let mut data = sample();
        let mut activity = Activity::new("1", ActivityType::Fertilization, Utc::now());
        activity.products.push(ProductUsage::new("p1"));
        data = data.with_activity_added(activity);

        let next = data.with_product_removed("p1").unwrap();
        assert_eq!(next.activities, data.activities);
        assert!(next.product("p1").is_none());
    }

    #[test]
    fn test_unknown_ids_yield_none() {
        let data = sample();
        assert!(data.with_plant_removed("missing").is_none());
        assert!(data.with_activity_removed("missing").is_none());
        assert!(data.with_product_removed("missing").is_none());
        assert!(data.with_plant_updated(Plant::new("x", "y", Utc::now())).is_none());
    }

    #[test]
    fn test_plant_update_replaces_in_place() {
        let data = sample();
        let updated = data.plants[0].with_phase(GrowthPhase::Flowering);
        let next = data.with_plant_updated(updated).unwrap();
        assert_eq!(next.plants[0].current_phase, GrowthPhase::Flowering);
        assert_eq!(next.plants.len(), data.plants.len());
        assert_eq!(next.plants[1], data.plants[1]);
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut data = sample();
        let duplicate = data.plants[0].clone();
        data.plants.push(duplicate);
        let err = data.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidImport { .. }));
        assert!(err.to_string().contains("duplicate plant id"));
    }

    #[test]
    fn test_validate_accepts_dangling_references() {
        let mut activity = Activity::new("ghost-plant", ActivityType::Watering, Utc::now());
        activity.products.push(ProductUsage::new("ghost-product"));
        let data = AppData::default().with_activity_added(activity);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let data: AppData = serde_json::from_str(r#"{"plants": []}"#).unwrap();
        assert_eq!(data, AppData::default());
    }
}
