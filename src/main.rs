use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use airsoft_hub::auth::JwtTokenService;
use airsoft_hub::config::Config;
use airsoft_hub::db::{self, postgres, PgStore, UserRepository};
use airsoft_hub::routes::create_routes;
use airsoft_hub::state::AppState;
use airsoft_hub::uploads::ThumbnailStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("airsoft_hub=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let pool = postgres::connect(&config.database_url, config.db_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Successfully connected to database");

    let store = Arc::new(PgStore::new(pool));
    store.migrate().await.expect("Failed to run migrations");
    tracing::info!("Migrations run successfully");

    let promoted = store
        .promote_admins(&config.admin_emails)
        .await
        .expect("Failed to promote admins");
    if promoted > 0 {
        tracing::info!(promoted, "Promoted admin accounts");
    }

    if config.seed_events {
        let seeded = db::seed_events(store.as_ref())
            .await
            .expect("Failed to seed events");
        if seeded > 0 {
            tracing::info!(seeded, "Seeded demo events");
        }
    }

    let tokens = Arc::new(JwtTokenService::new(&config.jwt_secret, config.token_ttl));
    let thumbnails = ThumbnailStore::new(&config.uploads_dir, config.upload_max_bytes);
    let state = AppState::new(store, tokens, thumbnails)
        .with_admin_emails(config.admin_emails.clone());

    let app: Router = create_routes(state, &config);

    tracing::info!("Server running at http://{}", config.address);

    let listener = TcpListener::bind(config.address)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
