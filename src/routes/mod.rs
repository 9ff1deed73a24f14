use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, Config, SecurityHeadersLayer};
use crate::handlers::auth::{login, me, register, update_me};
use crate::handlers::events::{create_event, delete_event, list_events, update_event};
use crate::handlers::health_check;
use crate::handlers::saved_events::{list_saved_events, save_event, unsave_event};
use crate::state::AppState;
use crate::uploads::UPLOADS_ROUTE;

fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id", put(update_event).delete(delete_event))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me).put(update_me))
}

fn api_routes() -> Router<AppState> {
    event_routes()
        .route("/events/:id/save", post(save_event).delete(unsave_event))
        .route("/saved-events", get(list_saved_events))
        .nest("/auth", auth_routes())
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let uploads = ServeDir::new(state.thumbnails.dir());
    let body_limit = state.thumbnails.body_limit();

    Router::new()
        .route("/health", get(health_check))
        .merge(event_routes())
        .nest("/api", api_routes())
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(SecurityHeadersLayer::new(config.is_production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
        .with_state(state)
}
