use crate::{auth, handlers, middleware, AppState};
use axum::{
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let users = Router::new()
        .route("/search", get(handlers::search_users))
        .route("/search/{query}", get(handlers::search_users_by_path))
        .route("/{id}", get(handlers::get_user))
        .route("/{id}/friends", get(handlers::get_user_friends))
        .route("/{id}/{friend_id}", patch(handlers::add_remove_friend))
        .route_layer(from_fn_with_state(state.clone(), auth::require_bearer));

    Router::new()
        // Liveness
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Friend graph
        .nest("/users", users)
        .with_state(state)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
