use std::net::TcpListener;
use std::sync::Arc;

use chirpy::configuration::{get_configuration, DatabaseSettings, StorageBackend};
use chirpy::startup::run;
use chirpy::store::{InMemoryStore, PgStore, Store};
use chirpy::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;

async fn build_store(database: &DatabaseSettings) -> std::io::Result<Arc<dyn Store>> {
    match database.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(InMemoryStore::default()))
        }
        StorageBackend::Postgres => {
            tracing::info!("Attempting to connect to database");

            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database.connection_string())
                .await
                .map_err(|e| {
                    tracing::error!("Failed to create connection pool: {}", e);
                    std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "Database connection error",
                    )
                })?;

            let store = PgStore::new(pool);
            store.migrate().await.map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, "Database migration error")
            })?;

            tracing::info!("Database connection pool created successfully");
            Ok(Arc::new(store))
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let store = build_store(&configuration.database).await?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!(platform = %configuration.application.platform, "Server listening on: {}", address);

    run(listener, store, configuration)?.await
}
