use std::sync::Arc;

use contacts_api::config;
use contacts_api::database::postgres::{connect_pool, PgPersonRepository, PgUserRepository};
use contacts_api::services::PersonService;
use contacts_api::storage::FirebaseObjectStore;
use contacts_api::{app, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Contacts API in {:?} mode", config.environment);

    let pool = connect_pool(&config.database)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));

    let service = PersonService::new(
        Arc::new(PgPersonRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool)),
        Arc::new(FirebaseObjectStore::new(&config.storage)),
        config.storage.api_base.clone(),
    );

    let app = app(AppState {
        service: Arc::new(service),
    });

    // Allow tests or deployments to override port via env
    let port = std::env::var("CONTACTS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3001);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Contacts API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
