//! Derived metrics over the journal.
//!
//! Everything here is a pure function of the aggregate (and, for elapsed days,
//! the current instant). Nothing is stored; values are recomputed on every
//! read so they can never go stale.

use crate::{
    errors::{Error, Result},
    models::{Activity, ActivityType, AppData, Plant, Product, ProductUsage},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Runoff EC may exceed input EC by at most this much before salt build-up is
/// flagged.
pub const EC_ALERT_THRESHOLD: f64 = 1.0;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days between the plant's start date and `now`, rounded down.
///
/// A plant started earlier today is on day 0. A start date in the future gives
/// a negative count.
#[must_use]
pub fn elapsed_days(plant: &Plant, now: DateTime<Utc>) -> i64 {
    (now - plant.start_date)
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY)
}

/// `ecOut - ecIn`, when both readings are present.
#[must_use]
pub fn ec_differential(activity: &Activity) -> Option<f64> {
    match (activity.ec_in, activity.ec_out) {
        (Some(ec_in), Some(ec_out)) => Some(ec_out - ec_in),
        _ => None,
    }
}

/// Whether runoff EC exceeds input EC by more than [`EC_ALERT_THRESHOLD`].
///
/// Missing readings never raise an alert.
#[must_use]
pub fn has_salt_buildup(activity: &Activity) -> bool {
    ec_differential(activity).is_some_and(|diff| diff > EC_ALERT_THRESHOLD)
}

/// Activities logged against `plant_id`, in store order (newest first).
pub fn activities_for_plant<'a>(
    activities: &'a [Activity],
    plant_id: &'a str,
) -> impl Iterator<Item = &'a Activity> + 'a {
    activities.iter().filter(move |a| a.plant_id == plant_id)
}

/// Training activities (defoliation, topping) of one plant, newest first.
/// These are the entries shown in a plant's photo gallery.
pub fn gallery_activities<'a>(
    activities: &'a [Activity],
    plant_id: &'a str,
) -> impl Iterator<Item = &'a Activity> + 'a {
    activities_for_plant(activities, plant_id).filter(|a| a.activity_type.is_training())
}

/// Resolves a usage to its product. A deleted product yields `None`.
#[must_use]
pub fn resolve_product<'a>(data: &'a AppData, usage: &ProductUsage) -> Option<&'a Product> {
    data.product(&usage.product_id)
}

/// One point of the EC/pH time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// When the reading was taken
    pub date: DateTime<Utc>,
    /// Input EC
    pub ec_in: Option<f64>,
    /// Runoff EC
    pub ec_out: Option<f64>,
    /// Input pH
    pub ph_in: Option<f64>,
    /// Runoff pH
    pub ph_out: Option<f64>,
}

impl From<&Activity> for ChartPoint {
    fn from(activity: &Activity) -> Self {
        Self {
            date: activity.date,
            ec_in: activity.ec_in,
            ec_out: activity.ec_out,
            ph_in: activity.ph_in,
            ph_out: activity.ph_out,
        }
    }
}

/// EC/pH series for one plant, oldest first.
///
/// Only activities with an input EC or input pH reading are included. Store
/// order is newest first, so it is reversed and then stably sorted by date;
/// activities sharing a date keep the order they were logged in.
#[must_use]
pub fn chart_series(activities: &[Activity], plant_id: &str) -> Vec<ChartPoint> {
    let mut readings: Vec<&Activity> = activities_for_plant(activities, plant_id)
        .filter(|a| a.ec_in.is_some() || a.ph_in.is_some())
        .collect();
    readings.reverse();
    readings.sort_by_key(|a| a.date);
    readings.into_iter().map(ChartPoint::from).collect()
}

/// Summary of one plant's history.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantReport {
    /// The plant being reported on
    pub plant: Plant,
    /// Whole days since the start date
    pub elapsed_days: i64,
    /// Number of activities logged against the plant
    pub activity_count: usize,
    /// Date of the most recent watering or fertilization
    pub last_watered: Option<DateTime<Utc>>,
    /// Most recent reading with input EC or pH
    pub latest_reading: Option<ChartPoint>,
    /// Activities whose EC differential raised an alert
    pub salt_alerts: usize,
    /// EC/pH series, oldest first
    pub series: Vec<ChartPoint>,
}

/// Builds a [`PlantReport`] for `plant_id`.
///
/// # Errors
/// Returns [`Error::PlantNotFound`] if the plant does not exist.
pub fn plant_report(data: &AppData, plant_id: &str, now: DateTime<Utc>) -> Result<PlantReport> {
    let plant = data.plant(plant_id).ok_or_else(|| Error::PlantNotFound {
        id: plant_id.to_string(),
    })?;

    let history: Vec<&Activity> = activities_for_plant(&data.activities, plant_id).collect();
    let last_watered = history
        .iter()
        .filter(|a| {
            matches!(
                a.activity_type,
                ActivityType::Watering | ActivityType::Fertilization
            )
        })
        .map(|a| a.date)
        .max();
    let salt_alerts = history.iter().filter(|a| has_salt_buildup(a)).count();
    let series = chart_series(&data.activities, plant_id);

    Ok(PlantReport {
        plant: plant.clone(),
        elapsed_days: elapsed_days(plant, now),
        activity_count: history.len(),
        last_watered,
        latest_reading: series.last().cloned(),
        salt_alerts,
        series,
    })
}

/// Formats an EC differential with its sign, e.g. `+1.30`.
#[must_use]
pub fn format_differential(diff: f64) -> String {
    format!("{diff:+.2}")
}
