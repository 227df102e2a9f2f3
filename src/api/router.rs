use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{handlers, state::AppState};

/// Build the API router.
///
/// `POST /api/login` and `GET /health` are open; everything else requires a
/// bearer token issued by the login endpoint.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/login", post(handlers::login_handler))
        .route("/api/debts/detailed", get(handlers::detailed_debts_handler))
        .route("/api/debts/summary", get(handlers::summary_debts_handler))
        .route("/api/debts/refresh", post(handlers::refresh_handler))
        .route("/api/notes/{customer_id}", get(handlers::list_notes_handler))
        .route("/api/notes", post(handlers::create_note_handler))
        .route(
            "/api/users",
            get(handlers::list_users_handler).post(handlers::create_user_handler),
        )
        .route("/api/users/{id}", delete(handlers::delete_user_handler))
        .with_state(state)
        // The dashboard is served from a different origin than the API.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process exits.
pub async fn start_server(state: Arc<AppState>, bind_addr: &str) -> Result<(), std::io::Error> {
    let app = create_router(state);

    tracing::info!("Serving dashboard API on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
