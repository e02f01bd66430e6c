use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursehub::api::router;
use coursehub::config::AppConfig;
use coursehub::db;
use coursehub::state::AppState;
use coursehub::storage::{HttpObjectStorage, NoopObjectStorage, ObjectStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "coursehub=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = db::init_pool(&config.database_url, config.max_connections).await?;

    let storage: Arc<dyn ObjectStorage> = match config.storage.clone() {
        Some(storage_config) => {
            info!("using object storage at {}", storage_config.base_url);
            Arc::new(HttpObjectStorage::new(storage_config)?)
        }
        None => {
            warn!("STORAGE_BASE_URL is not set; course images will not be persisted");
            Arc::new(NoopObjectStorage)
        }
    };

    let state = AppState { db: pool, storage };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
