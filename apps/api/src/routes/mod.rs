pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::engagement::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Domain documents
        .route(
            "/api/v1/:domain",
            get(handlers::handle_list_targets).post(handlers::handle_create_target),
        )
        .route("/api/v1/:domain/get/:id", get(handlers::handle_get_target))
        .route(
            "/api/v1/:domain/delete/:id",
            delete(handlers::handle_delete_target),
        )
        .route("/api/v1/:domain/like/:id", put(handlers::handle_like))
        .route("/api/v1/:domain/dislike/:id", put(handlers::handle_dislike))
        // Comment threads
        .route(
            "/api/v1/:domain/createComment",
            post(handlers::handle_create_comment),
        )
        .route(
            "/api/v1/:domain/getComments/:parent_id",
            get(handlers::handle_get_comments),
        )
        .route(
            "/api/v1/:domain/likeComment/:comment_id",
            put(handlers::handle_like_comment),
        )
        .route(
            "/api/v1/:domain/editComment/:comment_id",
            put(handlers::handle_edit_comment),
        )
        .route(
            "/api/v1/:domain/deleteComment/:comment_id",
            delete(handlers::handle_delete_comment),
        )
        .with_state(state)
}
