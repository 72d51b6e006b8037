//! Society ledger API server.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use society_api::{AppState, create_router};
use society_db::InMemoryDocumentStore;
use society_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "society=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    info!(
        cash_like_groups = ?config.ledger.cash_like_groups,
        members_advanced = %config.ledger.members_advanced_account,
        "Ledger settings loaded"
    );

    // Balances live in process memory; a restart starts from empty books.
    let store = Arc::new(InMemoryDocumentStore::new());
    let app = create_router(AppState::new(store, &config.ledger));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
