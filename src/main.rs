use clap::Parser;
use dotenvy::dotenv;
use grow_journal::{
    cli::{self, Cli},
    config::{self, database},
    core::JournalStore,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load the application configuration
    let app_config = config::load_config(&cli.config)
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!("Configuration loaded");

    // 4. Connect to storage and open the journal
    let database_url = database::get_database_url(app_config.storage.database_url.as_deref());
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    let mut store = JournalStore::open(
        db,
        app_config.storage.key.clone(),
        app_config.storage.seed_on_first_run,
    )
    .await
    .inspect_err(|e| error!("Failed to open journal: {}", e))?;

    // 5. Run the command
    let output = cli::execute(&mut store, cli.command, chrono::Utc::now()).await?;
    println!("{output}");

    Ok(())
}
