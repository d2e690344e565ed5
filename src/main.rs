use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use plantcare_api::config::Config;
use plantcare_api::services::seed;
use plantcare_api::store::{MemoryStore, PgStore, PlantStore};
use plantcare_api::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plantcare_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    let store: Arc<dyn PlantStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url)
                .await
                .context("Failed to connect to Postgres")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if config.seed_defaults {
        let report = seed::seed_defaults(
            store.as_ref(),
            config.default_images_dir.as_deref(),
            Utc::now(),
        )
        .await?;
        tracing::info!(
            plant_types_added = report.plant_types_added,
            locations_added = report.locations_added,
            "Default catalog seeded"
        );
    }

    let app = routes::app(AppState::new(store, config.clone()));

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
