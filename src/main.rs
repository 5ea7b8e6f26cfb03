use anyhow::Context;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use eventhub_server::config::Config;
use eventhub_server::routes::create_routes;
use eventhub_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("Invalid configuration")?;

    let pool = match &config.persistence {
        Some(persistence) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(persistence.database_url.expose())
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Successfully connected to database");

            sqlx::migrate!()
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations run successfully");

            Some(pool)
        }
        None => {
            tracing::warn!(
                "Persistence not configured; event routes disabled, tickets are only logged"
            );
            None
        }
    };

    if config.stripe_secret_key.is_none() {
        tracing::warn!("STRIPE_SECRET_KEY not set; checkout sessions cannot be created");
    }
    if config.stripe_webhook_secret.is_none() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set; webhooks will be accepted unverified");
    }

    let addr = config.bind_addr();
    let state = AppState::from_config(config, pool).context("Failed to build HTTP clients")?;
    let app = create_routes(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server running at http://{}", addr);

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
