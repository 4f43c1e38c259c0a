use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::Identity;
use crate::engagement::collections::{Collection, Domain};
use crate::engagement::store::EngagementStore;
use crate::errors::AppError;
use crate::models::engagement::{CommentRow, NewComment};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    /// Author asserted by the client; must match the authenticated caller.
    pub user_id: String,
    pub parent_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditCommentRequest {
    pub content: String,
}

/// Trims `content` and enforces non-empty and at most `max_len` characters.
pub fn normalize_content(content: &str, max_len: usize) -> Result<String, AppError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }
    let len = trimmed.chars().count();
    if len > max_len {
        return Err(AppError::Validation(format!(
            "content is {len} characters; the limit is {max_len}"
        )));
    }
    Ok(trimmed.to_string())
}

pub async fn create_comment(
    store: &dyn EngagementStore,
    domain: Domain,
    actor: &Identity,
    req: CreateCommentRequest,
    max_len: usize,
) -> Result<CommentRow, AppError> {
    if req.user_id != actor.user_id {
        return Err(AppError::Forbidden);
    }
    let content = normalize_content(&req.content, max_len)?;

    if store.get_target(domain, req.parent_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "{} {} not found",
            domain.noun(),
            req.parent_id
        )));
    }

    let comment = store
        .insert_comment(NewComment {
            id: Uuid::new_v4(),
            domain,
            parent_id: req.parent_id,
            author_id: actor.user_id.clone(),
            content,
            created_at: Utc::now(),
        })
        .await?;

    info!(
        "Created {domain} comment {} on {} by {}",
        comment.id, comment.parent_id, comment.author_id
    );
    Ok(comment)
}

/// Replaces the content of a comment. Only the author may edit.
pub async fn edit_comment(
    store: &dyn EngagementStore,
    domain: Domain,
    comment_id: Uuid,
    actor: &Identity,
    req: EditCommentRequest,
    max_len: usize,
) -> Result<CommentRow, AppError> {
    let existing = load_comment(store, domain, comment_id).await?;
    if existing.author_id != actor.user_id {
        return Err(AppError::Forbidden);
    }
    let content = normalize_content(&req.content, max_len)?;

    store
        .update_comment_content(domain, comment_id, &content, Utc::now())
        .await?
        // deleted between the ownership check and the write
        .ok_or_else(|| AppError::NotFound(format!("Comment {comment_id} not found")))
}

/// Hard-deletes a comment. Authors may delete their own; admins may delete any.
pub async fn delete_comment(
    store: &dyn EngagementStore,
    domain: Domain,
    comment_id: Uuid,
    actor: &Identity,
) -> Result<(), AppError> {
    let existing = load_comment(store, domain, comment_id).await?;
    let moderator = actor.is_admin && Collection::Comments(domain).admin_can_delete();
    if existing.author_id != actor.user_id && !moderator {
        return Err(AppError::Forbidden);
    }

    if !store.delete_comment(domain, comment_id).await? {
        return Err(AppError::NotFound(format!("Comment {comment_id} not found")));
    }

    info!(
        "Deleted {domain} comment {comment_id} (author {}, by {})",
        existing.author_id, actor.user_id
    );
    Ok(())
}

/// All comments on a parent, newest first.
pub async fn list_comments(
    store: &dyn EngagementStore,
    domain: Domain,
    parent_id: Uuid,
) -> Result<Vec<CommentRow>, AppError> {
    Ok(store.list_comments(domain, parent_id).await?)
}

async fn load_comment(
    store: &dyn EngagementStore,
    domain: Domain,
    comment_id: Uuid,
) -> Result<CommentRow, AppError> {
    store
        .get_comment(domain, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {comment_id} not found")))
}
