mod extract;
mod handlers;
mod response;

use axum::{
    http::HeaderValue,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub use response::{ApiError, ApiResponse, Deleted};

use crate::config::Config;
use crate::db::Database;

/// Router with permissive CORS, as used by tests and local development.
pub fn create_router(db: Database) -> Router {
    build_router(db, CorsLayer::permissive())
}

/// Router whose CORS policy follows the configuration.
pub fn create_router_with_config(db: Database, config: &Config) -> Router {
    build_router(db, cors_layer(config.cors_origins.as_deref()))
}

fn build_router(db: Database, cors: CorsLayer) -> Router {
    let feature = "/projects/{project_id}/features/{feature_id}";

    let api = Router::new()
        // Projects
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/{project_id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route(
            "/projects/{project_id}/branches",
            get(handlers::list_project_branches),
        )
        // Features
        .route(
            "/projects/{project_id}/features",
            get(handlers::list_features).post(handlers::create_feature),
        )
        .route(
            feature,
            get(handlers::get_feature)
                .put(handlers::update_feature)
                .delete(handlers::delete_feature),
        )
        .route(
            &format!("{feature}/verify-stack"),
            get(handlers::verify_stack),
        )
        // Branches
        .route(
            &format!("{feature}/branches"),
            get(handlers::list_branches).post(handlers::create_branch),
        )
        .route(
            &format!("{feature}/branches/reorder"),
            put(handlers::reorder_branches),
        )
        .route(
            &format!("{feature}/branches/{{branch_id}}"),
            get(handlers::get_branch)
                .put(handlers::update_branch)
                .delete(handlers::delete_branch),
        )
        // Comparisons
        .route(
            "/projects/{project_id}/comparisons",
            get(handlers::list_project_comparisons).post(handlers::create_comparison),
        )
        .route("/comparisons", get(handlers::list_comparisons))
        .route("/compare", get(handlers::compare_commands))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(db)
}

fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    match origins {
        None => CorsLayer::permissive(),
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match o.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", o);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}
