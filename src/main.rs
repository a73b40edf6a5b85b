use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use listings_admin_server::{
    AppState, Config, RedbUserDirectory, directory::load_seed_file, open_database, router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listings_admin_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Listings Admin Server...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Environment: {}, Server: {}",
        config.environment,
        config.server_address()
    );

    let db = open_database(&config.database_path)?;

    // Mirror the host's users before serving
    if let Some(seed_path) = &config.users_seed_path {
        let users = load_seed_file(seed_path)?;
        RedbUserDirectory::new(db.clone()).import(&users)?;
        tracing::info!("Loaded {} users from {}", users.len(), seed_path);
    }

    let addr: SocketAddr = config.server_address().parse()?;
    let app = router(AppState::new(db, config));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
