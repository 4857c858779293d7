use anyhow::Context;
use surveys_core::lifecycle::{LifecycleConfig, SurveyLifecycle};
use surveys_db::{DbConfig, PgSurveyStore};
use surveys_worker::config::{LogFormat, WorkerConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = WorkerConfig::from_env().context("Invalid worker configuration")?;

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "surveys_worker=debug,surveys_core=info".into());
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    tracing::info!(
        interval_secs = config.sweep_interval.as_secs(),
        log_format = ?config.log_format,
        "Loaded worker configuration"
    );

    // --- Database ---
    let db_config = DbConfig::from_env().context("Invalid database configuration")?;
    let pool = surveys_db::create_pool(&db_config)
        .await
        .context("Failed to connect to database")?;
    tracing::info!(max_connections = db_config.max_connections, "Database connection pool created");

    surveys_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    surveys_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Sweep ---
    let lifecycle_config =
        LifecycleConfig::from_env().context("Invalid survey lifecycle configuration")?;
    let lifecycle = SurveyLifecycle::with_config(PgSurveyStore::new(pool), lifecycle_config);
    let cancel = CancellationToken::new();
    let sweep_handle = tokio::spawn(surveys_worker::sweep::run(
        lifecycle,
        config.sweep_interval,
        cancel.clone(),
    ));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");

    cancel.cancel();
    sweep_handle.await.context("Sweep task panicked")?;
    tracing::info!("Worker stopped");
    Ok(())
}
