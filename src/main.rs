use clap::Parser;
use debtdesk::api::{start_server, AppState};
use debtdesk::auth::TokenSigner;
use debtdesk::config::{AppConfig, Cli};
use debtdesk::core::{run_scheduler, PipelineRunner, SnapshotPipeline};
use debtdesk::db::{self, NoteStore, UserStore};
use debtdesk::storage::JsonFileStore;
use debtdesk::upstream::BillingClient;
use debtdesk::utils::{logger, validation::Validate};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_logger(cli.verbose);

    tracing::info!("Starting debtdesk");

    let config = AppConfig::from_file(&cli.config)?;
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    let pool = db::connect(&config.database.path).await?;
    let notes = NoteStore::new(pool.clone());
    let users = UserStore::new(pool);

    seed_admin(&users, &config).await?;

    let store = Arc::new(JsonFileStore::new(&config.storage.data_dir));
    let source = Arc::new(BillingClient::new(&config.upstream)?);
    let pipeline = SnapshotPipeline::new(
        source,
        store.clone(),
        Arc::new(notes.clone()),
        config.upstream.max_pages,
    );
    let runner = Arc::new(PipelineRunner::new(pipeline));

    let interval = Duration::from_secs(config.scheduler.interval_minutes * 60);
    tokio::spawn(run_scheduler(
        runner.clone(),
        interval,
        config.scheduler.run_at_start,
    ));

    let signer = TokenSigner::new(&config.server.signing_key, config.server.token_ttl_hours);
    let state = Arc::new(AppState::new(
        store,
        notes,
        users,
        signer,
        runner,
        config.server.admin_name.clone(),
    ));

    start_server(state, &config.server.bind_addr).await?;

    Ok(())
}

/// Make sure the administrator account exists so the dashboard is reachable
/// on a fresh database.
async fn seed_admin(users: &UserStore, config: &AppConfig) -> anyhow::Result<()> {
    if users.find_by_name(&config.server.admin_name).await?.is_some() {
        return Ok(());
    }

    let Some(phone) = config.server.admin_phone.as_deref() else {
        tracing::warn!(
            "Admin account '{}' does not exist and no admin_phone is configured; \
             create it with the add_user binary",
            config.server.admin_name
        );
        return Ok(());
    };

    let hash = debtdesk::auth::hash_phone(phone)?;
    users.create(&config.server.admin_name, &hash).await?;
    tracing::info!("Seeded admin account '{}'", config.server.admin_name);
    Ok(())
}
