//! # Taskboard API Server
//!
//! Multi-user task tracker: registration, sessions, personal task lists and
//! an administrator who sees and reassigns every task.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (`.env` honoured)
//! 2. Initialise logging
//! 3. Open the store: PostgreSQL with migrations, or in-memory for
//!    `DATABASE_URL=memory://`
//! 4. Ensure the bootstrap admin exists
//! 5. Serve until Ctrl-C or SIGTERM
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=memory:// SESSION_SECRET=$(openssl rand -hex 32) cargo run -p taskboard-api
//! ```

use std::sync::Arc;

use anyhow::Context;
use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_shared::{
    credentials::BootstrapOutcome,
    db::{
        migrations::{applied_migrations, ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::postgres::PgStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskboard_api=debug,taskboard_shared=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.logging.json);

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let (state, pool) = if config.database.is_memory() {
        tracing::warn!("Using the in-memory store; data is lost on exit");
        (AppState::in_memory(config.clone()), None)
    } else {
        ensure_database_exists(&config.database.url)
            .await
            .context("Failed to prepare database")?;

        let pool = create_pool(DatabaseConfig {
            url: config.database.url.clone(),
            max_connections: config.database.max_connections,
            ..Default::default()
        })
        .await
        .context("Failed to connect to database")?;

        run_migrations(&pool).await.context("Failed to run migrations")?;
        let applied = applied_migrations(&pool)
            .await
            .context("Failed to read migration history")?;
        tracing::info!(applied, "Database migrations applied");

        let store = Arc::new(PgStore::new(pool.clone()));
        (AppState::new(store, config.clone()), Some(pool))
    };

    if config.bootstrap.enabled {
        let outcome = state
            .credentials
            .bootstrap_admin(
                &config.bootstrap.email,
                &config.bootstrap.username,
                &config.bootstrap.password,
            )
            .await
            .context("Failed to bootstrap admin account")?;

        if outcome == BootstrapOutcome::Created {
            tracing::info!(email = %config.bootstrap.email, "Admin account created");
        }
    }

    let app = build_router(state);
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}
