use std::env;

use dotenv::dotenv;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use votes_ledger::server::{create_app, run_server};
use votes_ledger::{Dependencies, ServiceError, Settings};
use votes_ledger_engine::VotesInvalidated;

/// Initialize tracing/logging. `LOG_FORMAT=json` switches to structured output.
fn init_tracing() -> Result<(), ServiceError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("votes_ledger=info,votes_ledger_engine=info,tower_http=info")
    });

    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
    };
    result.map_err(|e| ServiceError::config(format!("failed to install tracing subscriber: {e}")))?;

    info!(
        service_name = "votes-ledger",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
    Ok(())
}

/// Traces every invalidation event published after a committed vote.
async fn log_invalidations(mut events: broadcast::Receiver<VotesInvalidated>) {
    loop {
        match events.recv().await {
            Ok(event) => debug!(
                vote_target = %event.target,
                invalidated_at = event.invalidated_at,
                "Vote counts invalidated"
            ),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Invalidation log lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

/// Main entry point for the Votes Ledger service.
///
/// Loads `.env`, connects to PostgreSQL and serves the HTTP API until ctrl-c.
#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    dotenv().ok();
    init_tracing()?;

    let settings = Settings::from_env()?;
    let dependencies = match Dependencies::new(&settings).await {
        Ok(dependencies) => dependencies,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    tokio::spawn(log_invalidations(dependencies.invalidator.subscribe()));

    let app = create_app(dependencies.state, &settings.cors_allowed_origins)?;
    run_server(app, settings.server_addr).await
}
