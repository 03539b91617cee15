mod errors;
mod handlers;
mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use errors::HttpError;
pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route("/reports", post(handlers::reports))
        .route("/tab_render/form", post(handlers::tab_render_form))
        .route("/tab_render/data", post(handlers::tab_render_data))
        .route("/tabs", post(handlers::tabs))
        .route("/groups", post(handlers::groups))
        .route("/ingest", post(handlers::ingest));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
