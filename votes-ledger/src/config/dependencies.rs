//! Dependency initialization and wiring for the votes ledger service.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::time::sleep;
use tracing::{info, warn};
use votes_ledger_engine::{BroadcastInvalidator, CountsCache};
use votes_ledger_repository::PostgresVotesRepository;

use crate::config::{ConnectionMode, Settings};
use crate::errors::ServiceError;
use crate::server::state::AppState;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Handler state backed by PostgreSQL.
    pub state: AppState<PostgresVotesRepository>,
    /// Publishes an event after every committed vote.
    pub invalidator: Arc<BroadcastInvalidator>,
}

impl Dependencies {
    /// Connects to PostgreSQL, prepares the schema and wires the engine.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ServiceError)` - If the database is unreachable (only in fail-fast mode)
    ///   or its schema is not ready
    pub async fn new(settings: &Settings) -> Result<Self, ServiceError> {
        info!(
            server_addr = %settings.server_addr,
            max_connections = settings.max_connections,
            connection_mode = ?settings.connection_mode,
            retry_interval_secs = settings.retry_interval.as_secs(),
            run_migrations = settings.run_migrations,
            "Initializing dependencies"
        );

        let pool = Self::connect_to_database(settings).await?;
        info!("Database connection established");

        let repository = PostgresVotesRepository::new(pool).await?;
        if settings.run_migrations {
            repository.migrate().await?;
            info!("Migrations applied");
        }
        if !repository.check_tables_created().await? {
            return Err(ServiceError::config(
                "votes tables are missing; enable RUN_MIGRATIONS or apply the migrations",
            ));
        }

        let invalidator = Arc::new(BroadcastInvalidator::new(settings.invalidation_capacity));
        let cache = Arc::new(CountsCache::with_capacity(settings.counts_cache_capacity));
        let state = AppState::new(Arc::new(repository), invalidator.clone(), cache);

        Ok(Self { state, invalidator })
    }

    /// Connect to PostgreSQL with retry logic based on connection mode.
    async fn connect_to_database(settings: &Settings) -> Result<PgPool, ServiceError> {
        loop {
            match Self::try_connect(&settings.database_url, settings.max_connections).await {
                Ok(pool) => return Ok(pool),
                Err(e) => match settings.connection_mode {
                    ConnectionMode::FailFast => return Err(ServiceError::Database(e)),
                    ConnectionMode::Retry => {
                        warn!(
                            error = %e,
                            retry_interval_secs = settings.retry_interval.as_secs(),
                            "Failed to connect to PostgreSQL, retrying..."
                        );
                        sleep(settings.retry_interval).await;
                    }
                },
            }
        }
    }

    async fn try_connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
    }
}
