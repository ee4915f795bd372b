//! Command-line interface - argument definitions.
//!
//! The CLI is a thin presentation layer: it parses arguments, calls store
//! operations through [`handlers::execute`], and prints what comes back. It
//! never touches storage directly.

// clap derives document arguments through their help text
#![allow(missing_docs)]

pub mod handlers;

use crate::models::{ActivityType, GrowthPhase, ProductUsage};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub use handlers::execute;

#[derive(Parser, Debug)]
#[command(name = "grow-journal")]
#[command(about = "Track plants, care activities and nutrients")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, env = "GROW_JOURNAL_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage plants
    #[command(subcommand)]
    Plant(PlantCommand),
    /// Log and review care activities
    #[command(subcommand)]
    Activity(ActivityCommand),
    /// Manage the nutrient catalogue
    #[command(subcommand)]
    Product(ProductCommand),
    /// Show days, EC/pH series and alerts for a plant
    Stats {
        /// Plant id
        #[arg(long)]
        plant_id: String,
    },
    /// Write the whole journal as JSON
    Export {
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the whole journal with a JSON backup
    Import {
        /// Backup file produced by `export`
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum PlantCommand {
    /// List all plants
    List,
    /// Add a new plant
    Add(AddPlantArgs),
    /// Move a plant to another growth phase
    Phase {
        /// Plant id
        #[arg(long)]
        id: String,
        /// New phase (e.g. vegetative, flowering)
        #[arg(long)]
        phase: GrowthPhase,
    },
    /// Remove a plant and all of its activities
    Remove {
        /// Plant id
        #[arg(long)]
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct AddPlantArgs {
    /// Plant name
    #[arg(short = 'n', long = "name")]
    pub name: String,
    /// Strain or variety
    #[arg(short = 's', long = "strain")]
    pub strain: String,
    /// Start date (RFC 3339); defaults to now
    #[arg(long)]
    pub start_date: Option<DateTime<Utc>>,
    /// Photo URL; defaults to a placeholder image
    #[arg(long)]
    pub photo_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    /// List activities of a plant, newest first
    List {
        /// Plant id
        #[arg(long)]
        plant_id: String,
    },
    /// Log an activity
    Add(AddActivityArgs),
    /// Remove an activity
    Remove {
        /// Activity id
        #[arg(long)]
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct AddActivityArgs {
    /// Plant id
    #[arg(long)]
    pub plant_id: String,
    /// Activity type (watering, defoliation, topping, lst, fertilization, other)
    #[arg(short = 't', long = "type")]
    pub activity_type: ActivityType,
    /// When it happened (RFC 3339); defaults to now
    #[arg(long)]
    pub date: Option<DateTime<Utc>>,
    /// Water given in litres
    #[arg(long)]
    pub water: Option<f64>,
    /// Runoff in litres
    #[arg(long)]
    pub drain: Option<f64>,
    /// Input EC
    #[arg(long)]
    pub ec_in: Option<f64>,
    /// Runoff EC
    #[arg(long)]
    pub ec_out: Option<f64>,
    /// Input pH
    #[arg(long)]
    pub ph_in: Option<f64>,
    /// Runoff pH
    #[arg(long)]
    pub ph_out: Option<f64>,
    /// Free-text notes
    #[arg(long, default_value = "")]
    pub notes: String,
    /// Product used, as `<id>` or `<id>=<ml per litre>`; repeatable
    #[arg(long = "product", value_parser = parse_usage)]
    pub products: Vec<ProductUsage>,
}

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    /// List the catalogue
    List,
    /// Add a product
    Add(AddProductArgs),
    /// Remove a product (activities keep their references)
    Remove {
        /// Product id
        #[arg(long)]
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct AddProductArgs {
    /// Product name
    #[arg(short = 'n', long = "name")]
    pub name: String,
    /// Manufacturer
    #[arg(short = 'b', long = "brand")]
    pub brand: String,
    /// N-P-K ratio, e.g. 3-0-1
    #[arg(long, default_value = "")]
    pub npk: String,
    /// Category
    #[arg(short = 't', long = "type", default_value = crate::models::Product::DEFAULT_TYPE)]
    pub product_type: String,
    /// Stock on hand
    #[arg(long)]
    pub stock: Option<f64>,
}

/// Parses `<id>` or `<id>=<ml per litre>`.
fn parse_usage(raw: &str) -> std::result::Result<ProductUsage, String> {
    match raw.split_once('=') {
        None if !raw.trim().is_empty() => Ok(ProductUsage::new(raw.trim())),
        None => Err("product id cannot be empty".to_string()),
        Some((id, dose)) => {
            let id = id.trim();
            if id.is_empty() {
                return Err("product id cannot be empty".to_string());
            }
            let ml_per_liter = dose
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid dose '{dose}': {e}"))?;
            Ok(ProductUsage {
                product_id: id.to_string(),
                ml_per_liter,
            })
        }
    }
}
