//! Route table

use axum::routing::{get, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{admin, contact, pages};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/team", get(pages::team))
        .route("/story", get(pages::story))
        .route("/contact", get(pages::contact).post(contact::submit))
        .route("/api/admin/messages", get(admin::list))
        .route("/api/admin/messages/unread-count", get(admin::unread_count))
        .route("/api/admin/messages/{id}", get(admin::detail))
        .route("/api/admin/messages/{id}/read", put(admin::set_read))
        .route("/api/admin/messages/{id}/notes", put(admin::set_notes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
