//! Plant model - a single cultivation subject and its lifecycle phase.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Lifecycle phase of a plant.
///
/// Variants are declared in lifecycle order, so `Ord` follows the natural
/// progression. The store never enforces that order: a plant may move from any
/// phase to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GrowthPhase {
    /// Seed sprouting
    #[serde(alias = "Germinazione")]
    Germination,
    /// Leaf and root growth
    #[serde(alias = "Vegetativa")]
    Vegetative,
    /// Bud production
    #[serde(alias = "Fioritura")]
    Flowering,
    /// Post-harvest drying
    #[serde(alias = "Secca")]
    Drying,
    /// Post-drying cure
    #[serde(alias = "Concia")]
    Curing,
}

impl GrowthPhase {
    /// Every phase in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Germination,
        Self::Vegetative,
        Self::Flowering,
        Self::Drying,
        Self::Curing,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Germination => "Germination",
            Self::Vegetative => "Vegetative",
            Self::Flowering => "Flowering",
            Self::Drying => "Drying",
            Self::Curing => "Curing",
        }
    }

    /// Label used by records written by the original web client.
    #[must_use]
    pub const fn legacy_label(self) -> &'static str {
        match self {
            Self::Germination => "Germinazione",
            Self::Vegetative => "Vegetativa",
            Self::Flowering => "Fioritura",
            Self::Drying => "Secca",
            Self::Curing => "Concia",
        }
    }
}

impl fmt::Display for GrowthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GrowthPhase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|phase| {
                phase.label().eq_ignore_ascii_case(needle)
                    || phase.legacy_label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| Error::UnknownVariant {
                kind: "growth phase",
                value: s.to_string(),
            })
    }
}

/// A plant being cultivated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    /// Unique, immutable identifier
    pub id: String,
    /// Display name (e.g. "White Widow #1")
    pub name: String,
    /// Strain or variety
    pub strain: String,
    /// When cultivation started; elapsed days are derived from this
    pub start_date: DateTime<Utc>,
    /// External display image
    pub photo_url: String,
    /// Current lifecycle phase
    pub current_phase: GrowthPhase,
}

impl Plant {
    /// Creates a plant in [`GrowthPhase::Germination`] with a fresh id and a
    /// placeholder photo.
    #[must_use]
    pub fn new(name: impl Into<String>, strain: impl Into<String>, start_date: DateTime<Utc>) -> Self {
        let id = super::new_id();
        let photo_url = placeholder_photo_url(&id);
        Self {
            id,
            name: name.into(),
            strain: strain.into(),
            start_date,
            photo_url,
            current_phase: GrowthPhase::Germination,
        }
    }

    /// Returns a copy of this plant moved to `phase`.
    #[must_use]
    pub fn with_phase(&self, phase: GrowthPhase) -> Self {
        Self {
            current_phase: phase,
            ..self.clone()
        }
    }
}

/// Placeholder image keyed by `seed` so each plant gets a stable picture.
#[must_use]
pub fn placeholder_photo_url(seed: &str) -> String {
    format!("https://picsum.photos/seed/{seed}/400/600")
}
