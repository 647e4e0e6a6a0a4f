use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use users_shared::api::{ErrorResponse, FUNCTION_PREFIX};

use crate::handlers::{health, users as user_handlers};
use crate::middleware::{answer_options, cors_layer};
use crate::store::UserStore;
use crate::Config;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub config: Arc<Config>,
}

pub fn create_router(store: Arc<dyn UserStore>, config: Config) -> Router {
    let cors = cors_layer(&config.allowed_origins);
    let state = AppState {
        store,
        config: Arc::new(config),
    };

    let user_routes = Router::new()
        .route(
            "/",
            post(user_handlers::create_user).get(user_handlers::list_users),
        )
        .route(
            "/:id",
            get(user_handlers::get_user)
                .put(user_handlers::update_user)
                .delete(user_handlers::delete_user),
        );

    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .nest("/users", user_routes);

    Router::new()
        .nest(FUNCTION_PREFIX, api_routes)
        .fallback(not_found)
        .layer(middleware::from_fn(answer_options))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Not found".to_string(),
        }),
    )
}
