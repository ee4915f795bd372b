//! Activity model - a care event logged against one plant.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// Kind of care event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    /// Plain watering
    #[serde(alias = "Irrigazione")]
    Watering,
    /// Leaf removal
    #[serde(alias = "Defogliazione")]
    Defoliation,
    /// Cutting the main stem tip
    Topping,
    /// Low stress training
    #[serde(rename = "LST")]
    Lst,
    /// Watering with nutrients
    #[serde(alias = "Fertilizzazione")]
    Fertilization,
    /// Anything else
    #[serde(alias = "Altro")]
    Other,
}

impl ActivityType {
    /// Every activity type.
    pub const ALL: [Self; 6] = [
        Self::Watering,
        Self::Defoliation,
        Self::Topping,
        Self::Lst,
        Self::Fertilization,
        Self::Other,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Watering => "Watering",
            Self::Defoliation => "Defoliation",
            Self::Topping => "Topping",
            Self::Lst => "LST",
            Self::Fertilization => "Fertilization",
            Self::Other => "Other",
        }
    }

    /// Label used by records written by the original web client.
    #[must_use]
    pub const fn legacy_label(self) -> &'static str {
        match self {
            Self::Watering => "Irrigazione",
            Self::Defoliation => "Defogliazione",
            Self::Topping => "Topping",
            Self::Lst => "LST",
            Self::Fertilization => "Fertilizzazione",
            Self::Other => "Altro",
        }
    }

    /// Whether water, EC and pH readings are conventionally recorded for this
    /// type. Not enforced by the store.
    #[must_use]
    pub const fn records_measurements(self) -> bool {
        match self {
            Self::Watering | Self::Fertilization => true,
            Self::Defoliation | Self::Topping | Self::Lst | Self::Other => false,
        }
    }

    /// Whether this type produces a photo-worthy change (gallery view).
    #[must_use]
    pub const fn is_training(self) -> bool {
        match self {
            Self::Defoliation | Self::Topping => true,
            Self::Watering | Self::Lst | Self::Fertilization | Self::Other => false,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ActivityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.label().eq_ignore_ascii_case(needle)
                    || kind.legacy_label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| Error::UnknownVariant {
                kind: "activity type",
                value: s.to_string(),
            })
    }
}

/// Dose of one product used in an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUsage {
    /// Referenced product; may no longer exist
    pub product_id: String,
    /// Dose in millilitres per litre of water; a blank dose reads as the default
    #[serde(default = "default_dose", deserialize_with = "dose_or_default")]
    pub ml_per_liter: f64,
}

const fn default_dose() -> f64 {
    ProductUsage::DEFAULT_ML_PER_LITER
}

fn dose_or_default<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(ProductUsage::DEFAULT_ML_PER_LITER))
}

impl ProductUsage {
    /// Dose assigned when a product is first attached to an activity.
    pub const DEFAULT_ML_PER_LITER: f64 = 1.0;

    /// Usage of `product_id` at the default dose.
    #[must_use]
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            ml_per_liter: Self::DEFAULT_ML_PER_LITER,
        }
    }
}

/// A logged care event.
///
/// Measurement fields are independent: any subset may be present regardless of
/// [`ActivityType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Unique identifier
    pub id: String,
    /// Owning plant
    pub plant_id: String,
    /// Kind of event
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// When the event happened (user supplied)
    pub date: DateTime<Utc>,
    /// Water given, in litres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_liters: Option<f64>,
    /// Runoff collected, in litres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drain_liters: Option<f64>,
    /// Electrical conductivity of the input solution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ec_in: Option<f64>,
    /// Electrical conductivity of the runoff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ec_out: Option<f64>,
    /// pH of the input solution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph_in: Option<f64>,
    /// pH of the runoff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph_out: Option<f64>,
    /// Free text
    #[serde(default)]
    pub notes: String,
    /// Products used, in the order they were added
    #[serde(default)]
    pub products: Vec<ProductUsage>,
}

impl Activity {
    /// Creates an activity with a fresh id, no measurements and no products.
    #[must_use]
    pub fn new(plant_id: impl Into<String>, activity_type: ActivityType, date: DateTime<Utc>) -> Self {
        Self {
            id: super::new_id(),
            plant_id: plant_id.into(),
            activity_type,
            date,
            water_liters: None,
            drain_liters: None,
            ec_in: None,
            ec_out: None,
            ph_in: None,
            ph_out: None,
            notes: String::new(),
            products: Vec::new(),
        }
    }

    /// Present measurements paired with their persisted field names.
    pub fn measurements(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("waterLiters", self.water_liters),
            ("drainLiters", self.drain_liters),
            ("ecIn", self.ec_in),
            ("ecOut", self.ec_out),
            ("phIn", self.ph_in),
            ("phOut", self.ph_out),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
    }

    /// Rejects negative, NaN or infinite measurements and doses.
    ///
    /// JSON cannot carry non-finite numbers, so accepting them would break the
    /// persisted round trip.
    pub fn validate(&self) -> Result<()> {
        let doses = self
            .products
            .iter()
            .map(|usage| ("mlPerLiter", usage.ml_per_liter));
        for (field, value) in self.measurements().chain(doses) {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidMeasurement { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_activity_type_parsing() {
        assert_eq!("lst".parse::<ActivityType>().unwrap(), ActivityType::Lst);
        assert_eq!("Irrigazione".parse::<ActivityType>().unwrap(), ActivityType::Watering);
        assert!("mulching".parse::<ActivityType>().is_err());
    }

    #[test]
    fn test_only_watering_and_fertilization_record_measurements() {
        let measured: Vec<_> = ActivityType::ALL
            .into_iter()
            .filter(|kind| kind.records_measurements())
            .collect();
        assert_eq!(measured, vec![ActivityType::Watering, ActivityType::Fertilization]);
    }

    #[test]
    fn test_optional_fields_are_omitted_and_defaulted() {
        let activity = Activity::new("plant-1", ActivityType::Topping, Utc::now());
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "Topping");
        assert!(json.get("ecIn").is_none());

        let parsed: Activity = serde_json::from_str(
            r#"{"id":"a1","plantId":"1","type":"Irrigazione","date":"2024-05-01T10:00:00.000Z","ecIn":1.2}"#,
        )
        .unwrap();
        assert_eq!(parsed.activity_type, ActivityType::Watering);
        assert_eq!(parsed.ec_in, Some(1.2));
        assert!(parsed.notes.is_empty());
        assert!(parsed.products.is_empty());
    }

    #[test]
    fn test_validate_rejects_non_finite_and_negative_values() {
        let mut activity = Activity::new("plant-1", ActivityType::Watering, Utc::now());
        activity.ec_in = Some(1.4);
        activity.water_liters = Some(2.0);
        assert!(activity.validate().is_ok());

        activity.ph_out = Some(f64::NAN);
        assert!(matches!(
            activity.validate(),
            Err(Error::InvalidMeasurement { field: "phOut", .. })
        ));

        activity.ph_out = None;
        activity.products.push(ProductUsage {
            product_id: "p1".to_string(),
            ml_per_liter: -2.0,
        });
        assert!(matches!(
            activity.validate(),
            Err(Error::InvalidMeasurement { field: "mlPerLiter", .. })
        ));
    }

    #[test]
    fn test_product_usage_default_dose() {
        let usage = ProductUsage::new("p1");
        assert_eq!(usage.product_id, "p1");
        assert!((usage.ml_per_liter - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blank_dose_reads_as_default() {
        let null_dose: ProductUsage =
            serde_json::from_str(r#"{"productId":"p1","mlPerLiter":null}"#).unwrap();
        assert!((null_dose.ml_per_liter - ProductUsage::DEFAULT_ML_PER_LITER).abs() < f64::EPSILON);

        let missing_dose: ProductUsage = serde_json::from_str(r#"{"productId":"p2"}"#).unwrap();
        assert!(
            (missing_dose.ml_per_liter - ProductUsage::DEFAULT_ML_PER_LITER).abs() < f64::EPSILON
        );

        let explicit: ProductUsage =
            serde_json::from_str(r#"{"productId":"p3","mlPerLiter":2.5}"#).unwrap();
        assert!((explicit.ml_per_liter - 2.5).abs() < f64::EPSILON);
    }
}
