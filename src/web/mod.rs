//! The single-page surface: one router serving the chat page, the turn
//! handler endpoint, and the stylesheet.

mod handlers;
mod render;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::chat::ChatContext;

pub use render::Templates;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatContext>,
    pub templates: Templates,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/ask", post(handlers::ask))
        .route("/assets/style.css", get(handlers::stylesheet))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves until the process is killed.
pub async fn serve(addr: &str, chat: Arc<ChatContext>) -> eyre::Result<()> {
    let state = AppState {
        chat,
        templates: Templates::new()?,
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("UPSC Insight listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
