use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::engagement::collections::{Collection, Domain};
use crate::engagement::reactions::{Reaction, ReactionPolicy};
use crate::models::engagement::{CommentRow, NewComment, NewTarget, TargetRow};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Document store for engagement collections.
///
/// One implementation serves every domain; the `Domain` argument selects the
/// collection. Lookups that miss return `Ok(None)` / `Ok(false)` and leave the
/// NotFound decision to the caller.
///
/// Carried in `AppState` as `Arc<dyn EngagementStore>`.
#[async_trait]
pub trait EngagementStore: Send + Sync {
    async fn insert_target(&self, target: NewTarget) -> Result<TargetRow, StoreError>;

    async fn get_target(&self, domain: Domain, id: Uuid) -> Result<Option<TargetRow>, StoreError>;

    /// Newest first.
    async fn list_targets(&self, domain: Domain) -> Result<Vec<TargetRow>, StoreError>;

    /// Removes the target and its comment thread.
    async fn delete_target(&self, domain: Domain, id: Uuid) -> Result<bool, StoreError>;

    /// Flips `user_id`'s membership in one reaction set of a target and adjusts
    /// the paired counter in a single atomic step.
    async fn toggle_target_reaction(
        &self,
        domain: Domain,
        id: Uuid,
        user_id: &str,
        reaction: Reaction,
        policy: ReactionPolicy,
    ) -> Result<Option<TargetRow>, StoreError>;

    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRow, StoreError>;

    async fn get_comment(&self, domain: Domain, id: Uuid)
        -> Result<Option<CommentRow>, StoreError>;

    /// Newest first.
    async fn list_comments(
        &self,
        domain: Domain,
        parent_id: Uuid,
    ) -> Result<Vec<CommentRow>, StoreError>;

    async fn update_comment_content(
        &self,
        domain: Domain,
        id: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<Option<CommentRow>, StoreError>;

    async fn delete_comment(&self, domain: Domain, id: Uuid) -> Result<bool, StoreError>;

    async fn toggle_comment_like(
        &self,
        domain: Domain,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<CommentRow>, StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PgEngagementStore — PostgreSQL implementation
// ────────────────────────────────────────────────────────────────────────────

/// Builds the single-statement toggle for `collection`.
///
/// Bind order: `$1` document id, `$2` domain, `$3` user id. Every right-hand
/// side reads the pre-update row, so membership test, set mutation and
/// counter delta all agree, and the row lock taken by UPDATE serializes
/// concurrent toggles on the same document.
pub fn toggle_statement(
    collection: Collection,
    reaction: Reaction,
    policy: ReactionPolicy,
) -> String {
    let (set, count) = reaction.columns();
    let mut assignments = vec![
        format!(
            "{set} = CASE WHEN $3 = ANY({set}) THEN array_remove({set}, $3) \
             ELSE array_append({set}, $3) END"
        ),
        format!("{count} = {count} + CASE WHEN $3 = ANY({set}) THEN -1 ELSE 1 END"),
    ];

    if policy == ReactionPolicy::Exclusive {
        let (other, other_count) = reaction.opposite().columns();
        assignments.push(format!(
            "{other} = CASE WHEN $3 = ANY({set}) THEN {other} \
             ELSE array_remove({other}, $3) END"
        ));
        assignments.push(format!(
            "{other_count} = {other_count} - CASE WHEN NOT ($3 = ANY({set})) \
             AND $3 = ANY({other}) THEN 1 ELSE 0 END"
        ));
    }

    format!(
        "UPDATE {} SET {} WHERE id = $1 AND domain = $2 RETURNING *",
        collection.table(),
        assignments.join(", ")
    )
}

#[derive(Clone)]
pub struct PgEngagementStore {
    pool: PgPool,
}

impl PgEngagementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EngagementStore for PgEngagementStore {
    async fn insert_target(&self, target: NewTarget) -> Result<TargetRow, StoreError> {
        let row = sqlx::query_as::<_, TargetRow>(
            r#"
            INSERT INTO engagement_targets
                (id, domain, author_id, title, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(target.id)
        .bind(target.domain.as_str())
        .bind(&target.author_id)
        .bind(&target.title)
        .bind(&target.data)
        .bind(target.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_target(&self, domain: Domain, id: Uuid) -> Result<Option<TargetRow>, StoreError> {
        Ok(sqlx::query_as::<_, TargetRow>(
            "SELECT * FROM engagement_targets WHERE id = $1 AND domain = $2",
        )
        .bind(id)
        .bind(domain.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_targets(&self, domain: Domain) -> Result<Vec<TargetRow>, StoreError> {
        Ok(sqlx::query_as::<_, TargetRow>(
            "SELECT * FROM engagement_targets WHERE domain = $1 ORDER BY created_at DESC, seq DESC",
        )
        .bind(domain.as_str())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_target(&self, domain: Domain, id: Uuid) -> Result<bool, StoreError> {
        // comments go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM engagement_targets WHERE id = $1 AND domain = $2")
            .bind(id)
            .bind(domain.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle_target_reaction(
        &self,
        domain: Domain,
        id: Uuid,
        user_id: &str,
        reaction: Reaction,
        policy: ReactionPolicy,
    ) -> Result<Option<TargetRow>, StoreError> {
        let sql = toggle_statement(Collection::Targets(domain), reaction, policy);
        debug!("toggle {reaction} on {domain} {id}: {sql}");
        Ok(sqlx::query_as::<_, TargetRow>(&sql)
            .bind(id)
            .bind(domain.as_str())
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRow, StoreError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments
                (id, domain, parent_id, author_id, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(comment.id)
        .bind(comment.domain.as_str())
        .bind(comment.parent_id)
        .bind(&comment.author_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_comment(
        &self,
        domain: Domain,
        id: Uuid,
    ) -> Result<Option<CommentRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, CommentRow>("SELECT * FROM comments WHERE id = $1 AND domain = $2")
                .bind(id)
                .bind(domain.as_str())
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_comments(
        &self,
        domain: Domain,
        parent_id: Uuid,
    ) -> Result<Vec<CommentRow>, StoreError> {
        Ok(sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT * FROM comments
            WHERE domain = $1 AND parent_id = $2
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(domain.as_str())
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_comment_content(
        &self,
        domain: Domain,
        id: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<Option<CommentRow>, StoreError> {
        Ok(sqlx::query_as::<_, CommentRow>(
            r#"
            UPDATE comments SET content = $3, updated_at = $4
            WHERE id = $1 AND domain = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(domain.as_str())
        .bind(content)
        .bind(edited_at)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_comment(&self, domain: Domain, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND domain = $2")
            .bind(id)
            .bind(domain.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle_comment_like(
        &self,
        domain: Domain,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<CommentRow>, StoreError> {
        // comments carry no dislikes, so the policy never has anything to clear
        let sql = toggle_statement(
            Collection::Comments(domain),
            Reaction::Like,
            ReactionPolicy::Independent,
        );
        Ok(sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .bind(domain.as_str())
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independent_toggle_touches_only_one_set() {
        let sql = toggle_statement(
            Collection::Targets(Domain::Referral),
            Reaction::Like,
            ReactionPolicy::Independent,
        );
        assert!(sql.starts_with("UPDATE engagement_targets SET liked_by = CASE"));
        assert!(sql.contains("like_count = like_count + CASE WHEN $3 = ANY(liked_by) THEN -1 ELSE 1 END"));
        assert!(!sql.contains("disliked_by"));
        assert!(sql.ends_with("WHERE id = $1 AND domain = $2 RETURNING *"));
    }

    #[test]
    fn exclusive_toggle_clears_opposite_set_on_activation() {
        let sql = toggle_statement(
            Collection::Targets(Domain::Salary),
            Reaction::Dislike,
            ReactionPolicy::Exclusive,
        );
        assert!(sql.contains("disliked_by = CASE WHEN $3 = ANY(disliked_by)"));
        assert!(sql.contains(
            "liked_by = CASE WHEN $3 = ANY(disliked_by) THEN liked_by ELSE array_remove(liked_by, $3) END"
        ));
        assert!(sql.contains("like_count = like_count - CASE WHEN NOT ($3 = ANY(disliked_by))"));
    }

    #[test]
    fn comment_toggle_targets_comments_table() {
        let sql = toggle_statement(
            Collection::Comments(Domain::Resume),
            Reaction::Like,
            ReactionPolicy::Independent,
        );
        assert!(sql.starts_with("UPDATE comments SET"));
    }

    async fn seed_target(store: &PgEngagementStore, domain: Domain) -> TargetRow {
        store
            .insert_target(NewTarget {
                id: Uuid::new_v4(),
                domain,
                author_id: "author".to_string(),
                title: "Senior backend referral".to_string(),
                data: serde_json::json!({ "company": "Initech" }),
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL instance via DATABASE_URL"]
    async fn exclusive_like_then_dislike_moves_the_vote(pool: PgPool) {
        let store = PgEngagementStore::new(pool);
        let target = seed_target(&store, Domain::Referral).await;

        let liked = store
            .toggle_target_reaction(Domain::Referral, target.id, "u1", Reaction::Like, ReactionPolicy::Exclusive)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(liked.reactions.liked_by, vec!["u1"]);
        assert_eq!(liked.reactions.like_count, 1);

        let disliked = store
            .toggle_target_reaction(Domain::Referral, target.id, "u1", Reaction::Dislike, ReactionPolicy::Exclusive)
            .await
            .unwrap()
            .unwrap();
        assert!(disliked.reactions.liked_by.is_empty());
        assert_eq!(disliked.reactions.like_count, 0);
        assert_eq!(disliked.reactions.disliked_by, vec!["u1"]);
        assert_eq!(disliked.reactions.dislike_count, 1);
        assert!(disliked.reactions.is_consistent());

        // wrong domain leaves the row untouched
        assert!(store
            .toggle_target_reaction(Domain::Salary, target.id, "u2", Reaction::Like, ReactionPolicy::Exclusive)
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL instance via DATABASE_URL"]
    async fn concurrent_toggles_keep_counts_in_step(pool: PgPool) {
        let store = PgEngagementStore::new(pool);
        let id = seed_target(&store, Domain::Salary).await.id;

        let mut tasks = Vec::new();
        for n in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .toggle_target_reaction(
                        Domain::Salary,
                        id,
                        &format!("u{n}"),
                        Reaction::Like,
                        ReactionPolicy::Independent,
                    )
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let row = store.get_target(Domain::Salary, id).await.unwrap().unwrap();
        assert_eq!(row.reactions.liked_by.len(), 16);
        assert_eq!(row.reactions.like_count, 16);
        assert!(row.reactions.is_consistent());
    }
}
