use tracing::debug;
use uuid::Uuid;

use crate::auth::Identity;
use crate::engagement::collections::{Collection, Domain};
use crate::engagement::reactions::{Reaction, ReactionPolicy};
use crate::engagement::store::EngagementStore;
use crate::errors::AppError;
use crate::models::engagement::{CommentRow, TargetRow};

/// Flips the caller's like on a domain document.
pub async fn toggle_like(
    store: &dyn EngagementStore,
    domain: Domain,
    target_id: Uuid,
    actor: &Identity,
    policy: ReactionPolicy,
) -> Result<TargetRow, AppError> {
    toggle_target(store, domain, target_id, actor, Reaction::Like, policy).await
}

/// Flips the caller's dislike on a bipolar domain document.
pub async fn toggle_dislike(
    store: &dyn EngagementStore,
    domain: Domain,
    target_id: Uuid,
    actor: &Identity,
    policy: ReactionPolicy,
) -> Result<TargetRow, AppError> {
    toggle_target(store, domain, target_id, actor, Reaction::Dislike, policy).await
}

async fn toggle_target(
    store: &dyn EngagementStore,
    domain: Domain,
    target_id: Uuid,
    actor: &Identity,
    reaction: Reaction,
    policy: ReactionPolicy,
) -> Result<TargetRow, AppError> {
    let collection = Collection::Targets(domain);
    if !collection.supports(reaction) {
        return Err(AppError::Validation(format!(
            "{} entries do not support {reaction}s",
            collection.noun()
        )));
    }

    let updated = store
        .toggle_target_reaction(domain, target_id, &actor.user_id, reaction, policy)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {target_id} not found", collection.noun())))?;

    debug!(
        "{} toggled {reaction} on {domain} {target_id}: likes={} dislikes={}",
        actor.user_id, updated.reactions.like_count, updated.reactions.dislike_count
    );
    Ok(updated)
}

/// Flips the caller's like on a comment.
pub async fn toggle_comment_like(
    store: &dyn EngagementStore,
    domain: Domain,
    comment_id: Uuid,
    actor: &Identity,
) -> Result<CommentRow, AppError> {
    let updated = store
        .toggle_comment_like(domain, comment_id, &actor.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {comment_id} not found")))?;

    debug!(
        "{} toggled like on {domain} comment {comment_id}: likes={}",
        actor.user_id, updated.reactions.like_count
    );
    Ok(updated)
}
