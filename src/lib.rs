//! Bookshelf catalog server
//!
//! A small REST JSON API keeping a bookshelf in process memory: books can be
//! added, listed with a filter, fetched, replaced and removed.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build the state around an empty catalog
    pub fn new(config: AppConfig) -> Self {
        let services = services::Services::new(repository::Repository::new(), config.catalog.clone());

        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Books
        .route("/books", post(api::books::create_book).get(api::books::list_books))
        .route(
            "/books/:bookId",
            get(api::books::get_book)
                .put(api::books::update_book)
                .delete(api::books::delete_book),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .merge(routes)
        .merge(openapi)
        .fallback(api::not_found)
        .layer(CatchPanicLayer::custom(api::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
