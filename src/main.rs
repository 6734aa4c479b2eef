use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use license_gate::clock::Clock;
use license_gate::config::Config;
use license_gate::db::{AppState, create_pool, init_db};

#[derive(Parser, Debug)]
#[command(name = "license-gate")]
#[command(about = "License key issuance and hardware-bound validation server")]
struct Cli {
    /// Generate this many keys, print them, and exit without starting the server
    #[arg(long, value_name = "COUNT")]
    generate: Option<usize>,

    /// Expiry for --generate, in days (omit or 0 for lifetime keys)
    #[arg(long, requires = "generate")]
    expiry_days: Option<i64>,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

fn generate_keys(state: &AppState, count: usize, expiry_days: Option<i64>) -> Result<(), String> {
    let keys = state
        .licenses()
        .generate_many(count, expiry_days)
        .map_err(|e| format!("Failed to generate keys: {}", e))?;

    for key in &keys {
        match key.expires_at {
            Some(expires_at) => {
                let expires = chrono::DateTime::from_timestamp(expires_at, 0)
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| expires_at.to_string());
                println!("{}  expires {}", key.code, expires);
            }
            None => println!("{}  lifetime", key.code),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "license_gate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db_pool = create_pool(&config.database_path, config.store_timeout)
        .expect("Failed to create database pool");

    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        clock: Clock::system(),
        admin: config.admin.clone(),
    };

    if let Some(count) = cli.generate {
        if let Err(e) = generate_keys(&state, count, cli.expiry_days) {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if state.admin.is_none() {
        tracing::warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set: admin API will reject all requests");
    }

    let app = license_gate::app(state, config.rate_limit).layer(TraceLayer::new_for_http());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    if cli.ephemeral && !config.dev_mode {
        tracing::warn!("--ephemeral ignored: not in dev mode (set LICENSE_ENV=dev)");
    }
    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("License server listening on {}", addr);

    // Peer addresses are needed for per-IP rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    if cleanup_on_exit {
        let db_path = &config.database_path;
        if let Err(e) = std::fs::remove_file(db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
