use std::sync::Arc;

use server::config::Config;
use server::store::{DocumentStore, MemoryStore, PgStore};
use server::{db, routes, state};
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, ".env could not be loaded");
        }
    }

    let config = Config::from_env();

    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections)
                .await
                .expect("database init failed");
            info!(max_connections = config.db_max_connections, "using postgres document store");
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory document store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let port = config.port;
    let app = routes::app(state::AppState::new(store, config));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    info!(%port, "review server listening");
    axum::serve(listener, app).await.expect("server failed");
}
