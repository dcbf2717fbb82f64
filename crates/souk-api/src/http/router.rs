//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.
//!
//! The moderation bypass (unchecked comment deletion) is deliberately
//! absent here; it exists only as a `soukd moderate` CLI subcommand and
//! is gated at the deployment boundary.

use axum::Router;
use axum::routing::{delete, get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Accounts
        .route("/users", post(handlers::user::register))
        .route("/users/login", post(handlers::user::login))
        .route("/user", get(handlers::user::current_user))
        .route("/user", put(handlers::user::update_user))
        // Profiles and the following relation
        .route("/profiles/{username}", get(handlers::profile::get_profile))
        .route("/profiles/{username}/follow", post(handlers::profile::follow))
        .route(
            "/profiles/{username}/follow",
            delete(handlers::profile::unfollow),
        )
        // Catalog
        .route("/items", get(handlers::item::list_items))
        .route("/items", post(handlers::item::create_item))
        .route("/items/feed", get(handlers::item::feed))
        .route("/items/{slug}", get(handlers::item::get_item))
        .route("/items/{slug}", put(handlers::item::update_item))
        .route("/items/{slug}", delete(handlers::item::delete_item))
        .route("/items/{slug}/favorite", post(handlers::item::favorite))
        .route("/items/{slug}/favorite", delete(handlers::item::unfavorite))
        // Discussion
        .route(
            "/items/{slug}/comments",
            get(handlers::comment::list_comments).post(handlers::comment::add_comment),
        )
        .route(
            "/items/{slug}/comments/{id}",
            delete(handlers::comment::delete_comment),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Health check with a storage ping (no auth required).
async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::Json<serde_json::Value> {
    let storage = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.db_pool.reader)
        .await
        .is_ok();

    axum::Json(serde_json::json!({
        "status": if storage { "ok" } else { "degraded" },
        "storage": storage,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
