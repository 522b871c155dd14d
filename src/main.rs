//! Biblio Server - Book/Author/Library catalog API
//!
//! REST JSON API with per-entity CRUD and many-to-many relationship
//! management.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblio_server::{
    api,
    config::AppConfig,
    models::{Author, Book, Library},
    services::{ServiceLookup, Services},
    AppState, MIGRATOR,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("biblio_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Biblio Server v{}", env!("CARGO_PKG_VERSION"));

    // Ensure the local SQLite directory exists (no-op for other locations)
    std::fs::create_dir_all("data").ok();

    // Create database connection pool
    let options = SqliteConnectOptions::from_str(&config.database.url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(options)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(Services::new(pool)),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse().expect("Invalid host address"), server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CRUD routes shared by every entity type, registered under its prefix.
fn entity_routes<E: ServiceLookup>(prefix: &str) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{prefix}/"),
            get(api::entities::list::<E>).post(api::entities::create::<E>),
        )
        .route(&format!("{prefix}/count/"), get(api::entities::count::<E>))
        .route(&format!("{prefix}/paginated/"), get(api::entities::paginated::<E>))
        .route(
            &format!("{prefix}/bulk/"),
            post(api::entities::bulk_create::<E>).delete(api::entities::bulk_delete::<E>),
        )
        .route(
            &format!("{prefix}/:id/"),
            get(api::entities::get::<E>)
                .put(api::entities::update::<E>)
                .delete(api::entities::delete::<E>),
        )
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // System
        .route("/", get(api::health::root))
        .route("/health", get(api::health::health_check))
        .route("/statistics", get(api::health::statistics))
        // Entity CRUD
        .merge(entity_routes::<Book>("/book"))
        .merge(entity_routes::<Author>("/author"))
        .merge(entity_routes::<Library>("/library"))
        // Book relationships
        .route(
            "/book/:id/authors/:author_id/",
            post(api::relationships::add_author_to_book)
                .delete(api::relationships::remove_author_from_book),
        )
        .route("/book/:id/authors/", get(api::relationships::get_authors_of_book))
        .route(
            "/book/:id/library/:library_id/",
            post(api::relationships::add_library_to_book)
                .delete(api::relationships::remove_library_from_book),
        )
        .route("/book/:id/library/", get(api::relationships::get_libraries_of_book))
        // Author relationships
        .route(
            "/author/:id/books/:book_id/",
            post(api::relationships::add_book_to_author)
                .delete(api::relationships::remove_book_from_author),
        )
        .route("/author/:id/books/", get(api::relationships::get_books_of_author))
        // Library relationships
        .route(
            "/library/:id/books/:book_id/",
            post(api::relationships::add_book_to_library)
                .delete(api::relationships::remove_book_from_library),
        )
        .route("/library/:id/books/", get(api::relationships::get_books_of_library))
        // Book methods
        .route(
            "/book/:id/methods/decrease_stock/",
            post(api::books::decrease_stock),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
