use super::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/list_tables", get(handlers::list_tables_handler))
        .route(
            "/get_schema/{schema}/{table}",
            get(handlers::get_schema_handler),
        )
        .route("/ask", post(handlers::ask_handler))
        .route("/run_sql", post(handlers::run_sql_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
