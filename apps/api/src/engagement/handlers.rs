use axum::{extract::State, Json};
use uuid::Uuid;

use crate::auth::Identity;
use crate::engagement::collections::Domain;
use crate::engagement::comments::{self, CreateCommentRequest, EditCommentRequest};
use crate::engagement::targets::{self, CreateTargetRequest};
use crate::engagement::toggle;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::models::engagement::{CommentRow, TargetRow};
use crate::state::AppState;

/// POST /api/v1/:domain
pub async fn handle_create_target(
    State(state): State<AppState>,
    ApiPath(domain): ApiPath<Domain>,
    identity: Identity,
    ApiJson(req): ApiJson<CreateTargetRequest>,
) -> Result<Json<TargetRow>, AppError> {
    let target = targets::create_target(state.store.as_ref(), domain, &identity, req).await?;
    Ok(Json(target))
}

/// GET /api/v1/:domain
pub async fn handle_list_targets(
    State(state): State<AppState>,
    ApiPath(domain): ApiPath<Domain>,
) -> Result<Json<Vec<TargetRow>>, AppError> {
    Ok(Json(targets::list_targets(state.store.as_ref(), domain).await?))
}

/// GET /api/v1/:domain/get/:id
pub async fn handle_get_target(
    State(state): State<AppState>,
    ApiPath((domain, id)): ApiPath<(Domain, Uuid)>,
) -> Result<Json<TargetRow>, AppError> {
    Ok(Json(targets::get_target(state.store.as_ref(), domain, id).await?))
}

/// DELETE /api/v1/:domain/delete/:id
pub async fn handle_delete_target(
    State(state): State<AppState>,
    ApiPath((domain, id)): ApiPath<(Domain, Uuid)>,
    identity: Identity,
) -> Result<Json<&'static str>, AppError> {
    targets::delete_target(state.store.as_ref(), domain, id, &identity).await?;
    Ok(Json("Entry has been deleted."))
}

/// PUT /api/v1/:domain/like/:id
pub async fn handle_like(
    State(state): State<AppState>,
    ApiPath((domain, id)): ApiPath<(Domain, Uuid)>,
    identity: Identity,
) -> Result<Json<TargetRow>, AppError> {
    let updated = toggle::toggle_like(
        state.store.as_ref(),
        domain,
        id,
        &identity,
        state.config.reaction_policy,
    )
    .await?;
    Ok(Json(updated))
}

/// PUT /api/v1/:domain/dislike/:id
pub async fn handle_dislike(
    State(state): State<AppState>,
    ApiPath((domain, id)): ApiPath<(Domain, Uuid)>,
    identity: Identity,
) -> Result<Json<TargetRow>, AppError> {
    let updated = toggle::toggle_dislike(
        state.store.as_ref(),
        domain,
        id,
        &identity,
        state.config.reaction_policy,
    )
    .await?;
    Ok(Json(updated))
}

/// POST /api/v1/:domain/createComment
pub async fn handle_create_comment(
    State(state): State<AppState>,
    ApiPath(domain): ApiPath<Domain>,
    identity: Identity,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> Result<Json<CommentRow>, AppError> {
    let comment = comments::create_comment(
        state.store.as_ref(),
        domain,
        &identity,
        req,
        state.config.comment_max_len,
    )
    .await?;
    Ok(Json(comment))
}

/// GET /api/v1/:domain/getComments/:parent_id
pub async fn handle_get_comments(
    State(state): State<AppState>,
    ApiPath((domain, parent_id)): ApiPath<(Domain, Uuid)>,
) -> Result<Json<Vec<CommentRow>>, AppError> {
    Ok(Json(
        comments::list_comments(state.store.as_ref(), domain, parent_id).await?,
    ))
}

/// PUT /api/v1/:domain/likeComment/:comment_id
pub async fn handle_like_comment(
    State(state): State<AppState>,
    ApiPath((domain, comment_id)): ApiPath<(Domain, Uuid)>,
    identity: Identity,
) -> Result<Json<CommentRow>, AppError> {
    let updated =
        toggle::toggle_comment_like(state.store.as_ref(), domain, comment_id, &identity).await?;
    Ok(Json(updated))
}

/// PUT /api/v1/:domain/editComment/:comment_id
pub async fn handle_edit_comment(
    State(state): State<AppState>,
    ApiPath((domain, comment_id)): ApiPath<(Domain, Uuid)>,
    identity: Identity,
    ApiJson(req): ApiJson<EditCommentRequest>,
) -> Result<Json<CommentRow>, AppError> {
    let updated = comments::edit_comment(
        state.store.as_ref(),
        domain,
        comment_id,
        &identity,
        req,
        state.config.comment_max_len,
    )
    .await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/:domain/deleteComment/:comment_id
pub async fn handle_delete_comment(
    State(state): State<AppState>,
    ApiPath((domain, comment_id)): ApiPath<(Domain, Uuid)>,
    identity: Identity,
) -> Result<Json<&'static str>, AppError> {
    comments::delete_comment(state.store.as_ref(), domain, comment_id, &identity).await?;
    Ok(Json("Comment has been deleted."))
}
