use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::auth::Identity;
use crate::engagement::collections::Domain;
use crate::engagement::store::EngagementStore;
use crate::errors::AppError;
use crate::models::engagement::{NewTarget, TargetRow};

const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTargetRequest {
    pub user_id: String,
    pub title: String,
    /// Domain-specific fields (company, level, compensation, ...), stored as-is.
    #[serde(default)]
    pub data: Option<Value>,
}

pub async fn create_target(
    store: &dyn EngagementStore,
    domain: Domain,
    actor: &Identity,
    req: CreateTargetRequest,
) -> Result<TargetRow, AppError> {
    if req.user_id != actor.user_id {
        return Err(AppError::Forbidden);
    }
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }

    let data = match req.data {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(v @ Value::Object(_)) => v,
        Some(_) => return Err(AppError::Validation("data must be a JSON object".to_string())),
    };

    let target = store
        .insert_target(NewTarget {
            id: Uuid::new_v4(),
            domain,
            author_id: actor.user_id.clone(),
            title: title.to_string(),
            data,
            created_at: Utc::now(),
        })
        .await?;

    info!("Created {domain} {} by {}", target.id, target.author_id);
    Ok(target)
}

pub async fn get_target(
    store: &dyn EngagementStore,
    domain: Domain,
    id: Uuid,
) -> Result<TargetRow, AppError> {
    store
        .get_target(domain, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", domain.noun())))
}

pub async fn list_targets(
    store: &dyn EngagementStore,
    domain: Domain,
) -> Result<Vec<TargetRow>, AppError> {
    Ok(store.list_targets(domain).await?)
}

/// Author-only delete; the comment thread goes with it.
pub async fn delete_target(
    store: &dyn EngagementStore,
    domain: Domain,
    id: Uuid,
    actor: &Identity,
) -> Result<(), AppError> {
    let existing = get_target(store, domain, id).await?;
    if existing.author_id != actor.user_id {
        return Err(AppError::Forbidden);
    }
    if !store.delete_target(domain, id).await? {
        return Err(AppError::NotFound(format!("{} {id} not found", domain.noun())));
    }
    info!("Deleted {domain} {id} by {}", actor.user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::memory::MemoryEngagementStore;
    use serde_json::json;

    fn request(user: &str, title: &str, data: Option<Value>) -> CreateTargetRequest {
        CreateTargetRequest {
            user_id: user.to_string(),
            title: title.to_string(),
            data,
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let store = MemoryEngagementStore::new();
        let actor = Identity::user("u1");
        let created = create_target(
            &store,
            Domain::Referral,
            &actor,
            request("u1", " Referral for Globex ", Some(json!({ "company": "Globex" }))),
        )
        .await
        .unwrap();

        assert_eq!(created.title, "Referral for Globex");
        assert_eq!(created.domain, "referral");
        assert_eq!(created.reactions.like_count, 0);
        assert_eq!(created.reactions.dislike_count, 0);

        let fetched = get_target(&store, Domain::Referral, created.id).await.unwrap();
        assert_eq!(fetched.data["company"], "Globex");
    }

    #[tokio::test]
    async fn rejects_spoofing_and_bad_payloads() {
        let store = MemoryEngagementStore::new();
        let actor = Identity::user("u1");

        let err = create_target(&store, Domain::Salary, &actor, request("u2", "x", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let err = create_target(&store, Domain::Salary, &actor, request("u1", "  ", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = create_target(
            &store,
            Domain::Salary,
            &actor,
            request("u1", "ok", Some(json!([1, 2]))),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert!(list_targets(&store, Domain::Salary).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_author_deletes() {
        let store = MemoryEngagementStore::new();
        let created = create_target(
            &store,
            Domain::Resume,
            &Identity::user("u1"),
            request("u1", "One-page template", None),
        )
        .await
        .unwrap();

        // admins get no override on domain documents
        let err = delete_target(&store, Domain::Resume, created.id, &Identity::admin("mod"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        delete_target(&store, Domain::Resume, created.id, &Identity::user("u1"))
            .await
            .unwrap();
        let err = get_target(&store, Domain::Resume, created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
