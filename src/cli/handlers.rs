//! Command handlers - run a parsed command against the store.
//!
//! Handlers return the text to show rather than printing it, so the binary
//! decides where output goes and tests can inspect it.

use super::{
    ActivityCommand, AddActivityArgs, AddPlantArgs, AddProductArgs, Commands, PlantCommand,
    ProductCommand,
};
use crate::{
    core::{JournalStore, metrics},
    errors::Result,
    models::{Activity, AppData, Plant, Product},
};
use chrono::{DateTime, Utc};
use tracing::info;

/// Executes `command`, returning the text to display.
pub async fn execute(
    store: &mut JournalStore,
    command: Commands,
    now: DateTime<Utc>,
) -> Result<String> {
    match command {
        Commands::Plant(cmd) => plant(store, cmd, now).await,
        Commands::Activity(cmd) => activity(store, cmd, now).await,
        Commands::Product(cmd) => product(store, cmd).await,
        Commands::Stats { plant_id } => stats(store.data(), &plant_id, now),
        Commands::Export { output } => {
            let json = store.export_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    info!("Journal exported to {}", path.display());
                    Ok(format!("Journal exported to {}", path.display()))
                }
                None => Ok(json),
            }
        }
        Commands::Import { input } => {
            let text = std::fs::read_to_string(&input)?;
            store.import_json(&text).await?;
            let data = store.data();
            Ok(format!(
                "Imported {} plants, {} activities, {} products",
                data.plants.len(),
                data.activities.len(),
                data.products.len()
            ))
        }
    }
}

async fn plant(store: &mut JournalStore, cmd: PlantCommand, now: DateTime<Utc>) -> Result<String> {
    match cmd {
        PlantCommand::List => {
            if store.plants().is_empty() {
                return Ok("No plants yet".to_string());
            }
            Ok(store
                .plants()
                .iter()
                .map(|p| describe_plant(p, now))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        PlantCommand::Add(AddPlantArgs {
            name,
            strain,
            start_date,
            photo_url,
        }) => {
            let mut plant = Plant::new(name, strain, start_date.unwrap_or(now));
            if let Some(url) = photo_url {
                plant.photo_url = url;
            }
            let id = plant.id.clone();
            store.add_plant(plant).await?;
            Ok(format!("Plant added, ID: {id}"))
        }
        PlantCommand::Phase { id, phase } => {
            if store.set_plant_phase(&id, phase).await? {
                Ok(format!("Plant {id} is now in {phase}"))
            } else {
                Ok(format!("No plant found with ID {id}"))
            }
        }
        PlantCommand::Remove { id } => {
            let activities = metrics::activities_for_plant(store.activities(), &id).count();
            if store.delete_plant(&id).await? {
                Ok(format!("Plant {id} removed along with {activities} activities"))
            } else {
                Ok(format!("No plant found with ID {id}"))
            }
        }
    }
}

async fn activity(
    store: &mut JournalStore,
    cmd: ActivityCommand,
    now: DateTime<Utc>,
) -> Result<String> {
    match cmd {
        ActivityCommand::List { plant_id } => {
            let data = store.data();
            let lines: Vec<String> = metrics::activities_for_plant(&data.activities, &plant_id)
                .map(|a| describe_activity(data, a))
                .collect();
            if lines.is_empty() {
                Ok(format!("No activities for plant {plant_id}"))
            } else {
                Ok(lines.join("\n"))
            }
        }
        ActivityCommand::Add(args) => {
            let activity = build_activity(args, now);
            let id = activity.id.clone();
            let notices: Vec<String> = [unexpected_readings(&activity), salt_warning(&activity)]
                .into_iter()
                .flatten()
                .collect();
            store.add_activity(activity).await?;

            let mut out = format!("Activity logged, ID: {id}");
            for notice in notices {
                out.push('\n');
                out.push_str(&notice);
            }
            Ok(out)
        }
        ActivityCommand::Remove { id } => {
            if store.delete_activity(&id).await? {
                Ok(format!("Activity {id} removed"))
            } else {
                Ok(format!("No activity found with ID {id}"))
            }
        }
    }
}

async fn product(store: &mut JournalStore, cmd: ProductCommand) -> Result<String> {
    match cmd {
        ProductCommand::List => {
            if store.products().is_empty() {
                return Ok("No products yet".to_string());
            }
            Ok(store
                .products()
                .iter()
                .map(describe_product)
                .collect::<Vec<_>>()
                .join("\n"))
        }
        ProductCommand::Add(AddProductArgs {
            name,
            brand,
            npk,
            product_type,
            stock,
        }) => {
            let mut product = Product::new(name, brand, npk);
            product.product_type = product_type;
            product.stock_level = stock;
            let id = product.id.clone();
            store.add_product(product).await?;
            Ok(format!("Product added, ID: {id}"))
        }
        ProductCommand::Remove { id } => {
            if store.delete_product(&id).await? {
                Ok(format!("Product {id} removed"))
            } else {
                Ok(format!("No product found with ID {id}"))
            }
        }
    }
}

fn stats(data: &AppData, plant_id: &str, now: DateTime<Utc>) -> Result<String> {
    let report = metrics::plant_report(data, plant_id, now)?;
    let last_watered = report.last_watered.map_or_else(
        || "never".to_string(),
        |date| date.format("%Y-%m-%d %H:%M").to_string(),
    );

    let mut lines = vec![
        describe_plant(&report.plant, now),
        format!("Activities: {}", report.activity_count),
        format!("Last watered: {last_watered}"),
        format!("Salt build-up alerts: {}", report.salt_alerts),
    ];
    if report.series.is_empty() {
        lines.push("No EC/pH readings".to_string());
    } else {
        lines.push("Date        EC in  EC out  pH in  pH out".to_string());
        lines.extend(report.series.iter().map(|point| {
            format!(
                "{}  {:>5}  {:>6}  {:>5}  {:>6}",
                point.date.format("%Y-%m-%d"),
                reading(point.ec_in),
                reading(point.ec_out),
                reading(point.ph_in),
                reading(point.ph_out),
            )
        }));
    }
    Ok(lines.join("\n"))
}

fn build_activity(args: AddActivityArgs, now: DateTime<Utc>) -> Activity {
    let mut activity = Activity::new(args.plant_id, args.activity_type, args.date.unwrap_or(now));
    activity.water_liters = args.water;
    activity.drain_liters = args.drain;
    activity.ec_in = args.ec_in;
    activity.ec_out = args.ec_out;
    activity.ph_in = args.ph_in;
    activity.ph_out = args.ph_out;
    activity.notes = args.notes;
    activity.products = args.products;
    activity
}

fn salt_warning(activity: &Activity) -> Option<String> {
    if !metrics::has_salt_buildup(activity) {
        return None;
    }
    let diff = metrics::ec_differential(activity)?;
    Some(format!(
        "Warning: possible salt build-up, EC difference above {:.1} ({})",
        metrics::EC_ALERT_THRESHOLD,
        metrics::format_differential(diff)
    ))
}

fn unexpected_readings(activity: &Activity) -> Option<String> {
    let kind = activity.activity_type;
    if kind.records_measurements() || activity.measurements().next().is_none() {
        return None;
    }
    Some(format!(
        "Note: readings are not usually recorded for {kind} activities; they were kept as given"
    ))
}

fn describe_plant(plant: &Plant, now: DateTime<Utc>) -> String {
    format!(
        "{} '{}' ({}) - {}, day {}",
        plant.id,
        plant.name,
        plant.strain,
        plant.current_phase,
        metrics::elapsed_days(plant, now)
    )
}

fn describe_product(product: &Product) -> String {
    let mut line = format!(
        "{} '{}' by {} [{}] NPK {}",
        product.id, product.name, product.brand, product.product_type, product.npk
    );
    if let Some(stock) = product.stock_level {
        line.push_str(&format!(", stock {stock}"));
    }
    line
}

fn describe_activity(data: &AppData, activity: &Activity) -> String {
    let mut header = format!(
        "{} {} {}",
        activity.date.format("%Y-%m-%d %H:%M"),
        activity.activity_type,
        activity.id
    );
    for (field, value) in activity.measurements() {
        header.push_str(&format!(" {field}={value}"));
    }
    if metrics::has_salt_buildup(activity) {
        header.push_str(" [salt alert]");
    }

    let mut lines = vec![header];
    lines.extend(activity.products.iter().map(|usage| {
        match metrics::resolve_product(data, usage) {
            Some(product) => format!("    {} {} ml/L", product.name, usage.ml_per_liter),
            None => format!(
                "    unknown product ({}) {} ml/L",
                usage.product_id, usage.ml_per_liter
            ),
        }
    }));
    if !activity.notes.is_empty() {
        lines.push(format!("    {}", activity.notes));
    }
    lines.join("\n")
}

fn reading(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        cli::Cli,
        errors::Error,
        models::ProductUsage,
        test_utils::{TEST_KEY, open_test_store},
    };
    use clap::Parser;

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["grow-journal"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[tokio::test]
    async fn test_plant_lifecycle_through_cli() -> Result<()> {
        let mut store = open_test_store().await?;
        let now = Utc::now();

        let out = execute(
            &mut store,
            parse(&["plant", "add", "--name", "Gorilla", "--strain", "GG4"]),
            now,
        )
        .await?;
        assert!(out.starts_with("Plant added, ID: "));
        let id = out.trim_start_matches("Plant added, ID: ").to_string();
        assert_eq!(store.plant(&id).unwrap().name, "Gorilla");

        let out = execute(
            &mut store,
            parse(&["plant", "phase", "--id", id.as_str(), "--phase", "flowering"]),
            now,
        )
        .await?;
        assert_eq!(out, format!("Plant {id} is now in Flowering"));

        let list = execute(&mut store, parse(&["plant", "list"]), now).await?;
        assert!(list.contains("'Gorilla' (GG4) - Flowering, day 0"));
        assert!(list.contains("'White Widow #1'"));

        let out = execute(&mut store, parse(&["plant", "remove", "--id", id.as_str()]), now).await?;
        assert_eq!(out, format!("Plant {id} removed along with 0 activities"));

        let out = execute(&mut store, parse(&["plant", "remove", "--id", id.as_str()]), now).await?;
        assert_eq!(out, format!("No plant found with ID {id}"));
        Ok(())
    }

    #[tokio::test]
    async fn test_activity_add_warns_on_salt_buildup() -> Result<()> {
        let mut store = open_test_store().await?;
        let now = Utc::now();

        let out = execute(
            &mut store,
            parse(&[
                "activity", "add", "--plant-id", "1", "--type", "watering", "--ec-in", "1.0",
                "--ec-out", "2.3", "--product", "p1=2", "--product", "gone",
            ]),
            now,
        )
        .await?;
        assert!(out.contains("Activity logged"));
        assert!(out.contains("EC difference above 1.0 (+1.30)"));

        let activity = &store.activities()[0];
        assert_eq!(activity.products[0], ProductUsage {
            product_id: "p1".to_string(),
            ml_per_liter: 2.0,
        });

        let list = execute(&mut store, parse(&["activity", "list", "--plant-id", "1"]), now).await?;
        assert!(list.contains("[salt alert]"));
        assert!(list.contains("Grow A 2 ml/L"));
        assert!(list.contains("unknown product (gone) 1 ml/L"));
        Ok(())
    }

    #[tokio::test]
    async fn test_activity_add_without_alert() -> Result<()> {
        let mut store = open_test_store().await?;
        let out = execute(
            &mut store,
            parse(&[
                "activity", "add", "--plant-id", "1", "--type", "watering", "--ec-in", "1.2",
                "--ec-out", "1.8",
            ]),
            Utc::now(),
        )
        .await?;
        assert!(!out.contains("Warning"));
        assert!(!out.contains("Note"));
        Ok(())
    }

    #[tokio::test]
    async fn test_activity_add_notes_readings_on_training() -> Result<()> {
        let mut store = open_test_store().await?;
        let now = Utc::now();

        let out = execute(
            &mut store,
            parse(&["activity", "add", "--plant-id", "1", "--type", "topping", "--ph-in", "6.0"]),
            now,
        )
        .await?;
        assert!(out.contains("readings are not usually recorded for Topping activities"));
        assert_eq!(store.activities()[0].ph_in, Some(6.0));

        let out = execute(
            &mut store,
            parse(&["activity", "add", "--plant-id", "1", "--type", "defoliation"]),
            now,
        )
        .await?;
        assert!(!out.contains("Note"));
        Ok(())
    }

    #[tokio::test]
    async fn test_stats_output() -> Result<()> {
        let mut store = open_test_store().await?;
        let now = Utc::now();
        execute(
            &mut store,
            parse(&[
                "activity", "add", "--plant-id", "1", "--type", "fertilization", "--ph-in",
                "6.2",
            ]),
            now,
        )
        .await?;

        let out = execute(&mut store, parse(&["stats", "--plant-id", "1"]), now).await?;
        assert!(out.contains("day 30"));
        assert!(out.contains("Activities: 1"));
        assert!(out.contains("6.20"));

        let missing = execute(&mut store, parse(&["stats", "--plant-id", "nope"]), now).await;
        assert!(matches!(missing, Err(Error::PlantNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_products_through_cli() -> Result<()> {
        let mut store = open_test_store().await?;
        let now = Utc::now();

        execute(
            &mut store,
            parse(&[
                "product", "add", "--name", "Big Bud", "--brand", "Advanced Nutrients", "--npk",
                "0-1-3", "--stock", "0.5",
            ]),
            now,
        )
        .await?;
        let list = execute(&mut store, parse(&["product", "list"]), now).await?;
        assert!(list.contains("'Big Bud' by Advanced Nutrients [Fertilizer] NPK 0-1-3, stock 0.5"));

        let out = execute(&mut store, parse(&["product", "remove", "--id", "p1"]), now).await?;
        assert_eq!(out, "Product p1 removed");
        assert_eq!(store.products().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_export_import_files() -> Result<()> {
        let mut store = open_test_store().await?;
        let now = Utc::now();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("backup.json");
        let path_str = path.to_str().unwrap();

        execute(&mut store, parse(&["export", "--output", path_str]), now).await?;
        execute(&mut store, parse(&["plant", "remove", "--id", "1"]), now).await?;
        assert!(store.plants().is_empty());

        let out = execute(&mut store, parse(&["import", "--input", path_str]), now).await?;
        assert_eq!(out, "Imported 1 plants, 0 activities, 2 products");
        assert_eq!(store.plants().len(), 1);
        assert_eq!(store.key(), TEST_KEY);

        let stdout = execute(&mut store, parse(&["export"]), now).await?;
        let parsed: AppData = serde_json::from_str(&stdout)?;
        assert_eq!(parsed, *store.data());
        Ok(())
    }
}
