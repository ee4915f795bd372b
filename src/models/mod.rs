//! Domain model - plain data for the journal.
//!
//! These types are serialized as one JSON document (see [`AppData`]). Field
//! names are camelCase on disk so records written by the original web client
//! load unchanged.

pub mod activity;
pub mod app_data;
pub mod plant;
pub mod product;

pub use activity::{Activity, ActivityType, ProductUsage};
pub use app_data::AppData;
pub use plant::{GrowthPhase, Plant, placeholder_photo_url};
pub use product::Product;

/// Generates a collision-resistant identifier for a new record.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
