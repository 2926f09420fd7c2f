use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::signal;
use tracing::{error, info, warn};

use servorder_api::{build_router, AppState, Repositories};
use servorder_core::notifier::StatusNotifier;
use servorder_infrastructure::{
    create_pool, run_migrations, MemoryStore, PgClientRepository, PgCompanyRepository, PgServiceOrderRepository,
    PgStoreRepository, PgUserRepository, ZapiNotifier,
};
use servorder_shared::config::AppConfig;
use servorder_shared::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (reads .env first)
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry; the guard flushes the log file on exit
    let _log_guard = init_telemetry(&config.logging)?;

    info!("{} starting ({})...", config.app.name, config.app.env);

    let (repos, pool) = if config.database.url.is_empty() {
        warn!("database.url is empty; using in-memory repositories. Data is lost on exit.");
        (memory_repositories(), None)
    } else {
        // Connect to Database
        info!("Connecting to database...");
        let pool = create_pool(&config.database).await?;
        info!("Database connection established.");

        if config.database.run_migrations {
            run_migrations(&pool).await?;
            info!("Migrations applied.");
        }
        (postgres_repositories(&pool), Some(pool))
    };

    let notifier: Option<Arc<dyn StatusNotifier>> = if config.whatsapp.enabled {
        info!("WhatsApp notifications enabled.");
        Some(Arc::new(ZapiNotifier::new(&config.whatsapp)?))
    } else {
        warn!("WhatsApp notifications disabled; status changes will be recorded as SKIPPED.");
        None
    };

    // Create App State
    let state = AppState::new(
        repos,
        notifier,
        &config.jwt,
        &config.security,
        &config.whatsapp.default_country_code,
        pool,
    );

    let bootstrap = &config.bootstrap;
    if let (Some(email), Some(password)) = (&bootstrap.super_admin_email, &bootstrap.super_admin_password) {
        let name = bootstrap.super_admin_name.as_deref().unwrap_or("Super Admin");
        if let Err(e) = state.user_service.bootstrap_super_admin(name, email, password).await {
            error!("Failed to bootstrap super admin: {}", e);
            return Err(e.into());
        }
    }

    // Build router
    let app = build_router(state, &config.app);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

fn postgres_repositories(pool: &PgPool) -> Repositories {
    Repositories {
        companies: Arc::new(PgCompanyRepository::new(pool.clone())),
        stores: Arc::new(PgStoreRepository::new(pool.clone())),
        users: Arc::new(PgUserRepository::new(pool.clone())),
        clients: Arc::new(PgClientRepository::new(pool.clone())),
        orders: Arc::new(PgServiceOrderRepository::new(pool.clone())),
    }
}

fn memory_repositories() -> Repositories {
    let store = Arc::new(MemoryStore::new());
    Repositories {
        companies: store.clone(),
        stores: store.clone(),
        users: store.clone(),
        clients: store.clone(),
        orders: store,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received.");
}
