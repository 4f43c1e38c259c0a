use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::engagement::collections::Domain;
use crate::engagement::reactions::{Reaction, ReactionPolicy};
use crate::engagement::store::{EngagementStore, StoreError};
use crate::models::engagement::{CommentRow, NewComment, NewTarget, TargetRow};

/// Process-local store with the same semantics as the PostgreSQL one.
/// Used for `STORE_BACKEND=memory` and in tests.
///
/// Each document keeps an insertion sequence number so that documents created
/// within the same timestamp still list newest first.
#[derive(Default)]
pub struct MemoryEngagementStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_seq: u64,
    targets: HashMap<Uuid, (u64, TargetRow)>,
    comments: HashMap<Uuid, (u64, CommentRow)>,
}

impl Inner {
    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

impl MemoryEngagementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T: Clone>(
    mut docs: Vec<&(u64, T)>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    docs.sort_by(|(a_seq, a), (b_seq, b)| {
        created_at(b)
            .cmp(&created_at(a))
            .then_with(|| b_seq.cmp(a_seq))
    });
    docs.into_iter().map(|(_, doc)| doc.clone()).collect()
}

#[async_trait]
impl EngagementStore for MemoryEngagementStore {
    async fn insert_target(&self, target: NewTarget) -> Result<TargetRow, StoreError> {
        let mut inner = self.inner.write().await;
        let seq = inner.bump();
        let row = TargetRow::from(target);
        inner.targets.insert(row.id, (seq, row.clone()));
        Ok(row)
    }

    async fn get_target(&self, domain: Domain, id: Uuid) -> Result<Option<TargetRow>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .targets
            .get(&id)
            .filter(|(_, t)| t.domain == domain.as_str())
            .map(|(_, t)| t.clone()))
    }

    async fn list_targets(&self, domain: Domain) -> Result<Vec<TargetRow>, StoreError> {
        let inner = self.inner.read().await;
        let docs: Vec<_> = inner
            .targets
            .values()
            .filter(|(_, t)| t.domain == domain.as_str())
            .collect();
        Ok(newest_first(docs, |t: &TargetRow| t.created_at))
    }

    async fn delete_target(&self, domain: Domain, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let matches = inner
            .targets
            .get(&id)
            .is_some_and(|(_, t)| t.domain == domain.as_str());
        if !matches {
            return Ok(false);
        }
        inner.targets.remove(&id);
        inner.comments.retain(|_, (_, c)| c.parent_id != id);
        Ok(true)
    }

    async fn toggle_target_reaction(
        &self,
        domain: Domain,
        id: Uuid,
        user_id: &str,
        reaction: Reaction,
        policy: ReactionPolicy,
    ) -> Result<Option<TargetRow>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .targets
            .get_mut(&id)
            .filter(|(_, t)| t.domain == domain.as_str())
            .map(|(_, t)| {
                t.reactions.toggle(reaction, user_id, policy);
                debug_assert!(t.reactions.is_consistent());
                t.clone()
            }))
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRow, StoreError> {
        let mut inner = self.inner.write().await;
        let seq = inner.bump();
        let row = CommentRow::from(comment);
        inner.comments.insert(row.id, (seq, row.clone()));
        Ok(row)
    }

    async fn get_comment(
        &self,
        domain: Domain,
        id: Uuid,
    ) -> Result<Option<CommentRow>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .comments
            .get(&id)
            .filter(|(_, c)| c.domain == domain.as_str())
            .map(|(_, c)| c.clone()))
    }

    async fn list_comments(
        &self,
        domain: Domain,
        parent_id: Uuid,
    ) -> Result<Vec<CommentRow>, StoreError> {
        let inner = self.inner.read().await;
        let docs: Vec<_> = inner
            .comments
            .values()
            .filter(|(_, c)| c.domain == domain.as_str() && c.parent_id == parent_id)
            .collect();
        Ok(newest_first(docs, |c: &CommentRow| c.created_at))
    }

    async fn update_comment_content(
        &self,
        domain: Domain,
        id: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<Option<CommentRow>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .comments
            .get_mut(&id)
            .filter(|(_, c)| c.domain == domain.as_str())
            .map(|(_, c)| {
                c.content = content.to_string();
                c.updated_at = edited_at;
                c.clone()
            }))
    }

    async fn delete_comment(&self, domain: Domain, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let matches = inner
            .comments
            .get(&id)
            .is_some_and(|(_, c)| c.domain == domain.as_str());
        if matches {
            inner.comments.remove(&id);
        }
        Ok(matches)
    }

    async fn toggle_comment_like(
        &self,
        domain: Domain,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<CommentRow>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .comments
            .get_mut(&id)
            .filter(|(_, c)| c.domain == domain.as_str())
            .map(|(_, c)| {
                c.reactions
                    .toggle(Reaction::Like, user_id, ReactionPolicy::Independent);
                debug_assert!(c.reactions.is_consistent());
                c.clone()
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use std::sync::Arc;

    fn new_target(domain: Domain, created_at: DateTime<Utc>) -> NewTarget {
        NewTarget {
            id: Uuid::new_v4(),
            domain,
            author_id: "author".to_string(),
            title: "Staff engineer referral".to_string(),
            data: json!({ "company": "Acme" }),
            created_at,
        }
    }

    fn new_comment(
        domain: Domain,
        parent_id: Uuid,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> NewComment {
        NewComment {
            id: Uuid::new_v4(),
            domain,
            parent_id,
            author_id: "u1".to_string(),
            content: content.to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn lookups_are_scoped_to_domain() {
        let store = MemoryEngagementStore::new();
        let target = store
            .insert_target(new_target(Domain::Referral, Utc::now()))
            .await
            .unwrap();

        assert!(store
            .get_target(Domain::Referral, target.id)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .get_target(Domain::Salary, target.id)
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete_target(Domain::Salary, target.id).await.unwrap());
    }

    #[tokio::test]
    async fn lists_comments_newest_first_with_insertion_tiebreak() {
        let store = MemoryEngagementStore::new();
        let parent = store
            .insert_target(new_target(Domain::Resume, Utc::now()))
            .await
            .unwrap();
        let t1 = Utc::now();
        let t2 = t1 + Duration::seconds(1);

        for (content, at) in [("first", t1), ("second", t2), ("also-second", t2)] {
            store
                .insert_comment(new_comment(Domain::Resume, parent.id, content, at))
                .await
                .unwrap();
        }
        // a comment on another parent must not leak in
        store
            .insert_comment(new_comment(Domain::Resume, Uuid::new_v4(), "other", t2))
            .await
            .unwrap();

        let listed: Vec<String> = store
            .list_comments(Domain::Resume, parent.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(listed, vec!["also-second", "second", "first"]);
    }

    #[tokio::test]
    async fn deleting_target_drops_its_comments() {
        let store = MemoryEngagementStore::new();
        let parent = store
            .insert_target(new_target(Domain::Salary, Utc::now()))
            .await
            .unwrap();
        let comment = store
            .insert_comment(new_comment(Domain::Salary, parent.id, "hi", Utc::now()))
            .await
            .unwrap();

        assert!(store.delete_target(Domain::Salary, parent.id).await.unwrap());
        assert!(store
            .get_comment(Domain::Salary, comment.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn toggle_on_missing_document_returns_none() {
        let store = MemoryEngagementStore::new();
        let missing = Uuid::new_v4();
        assert!(store
            .toggle_target_reaction(
                Domain::Interview,
                missing,
                "u1",
                Reaction::Like,
                ReactionPolicy::Independent
            )
            .await
            .unwrap()
            .is_none());
        assert!(store
            .toggle_comment_like(Domain::Interview, missing, "u1")
            .await
            .unwrap()
            .is_none());
    }

    async fn toggle_concurrently(
        store: &Arc<MemoryEngagementStore>,
        id: Uuid,
        calls: Vec<(String, Reaction)>,
        policy: ReactionPolicy,
    ) {
        let tasks: Vec<_> = calls
            .into_iter()
            .map(|(user, reaction)| {
                let store = Arc::clone(store);
                tokio::spawn(async move {
                    store
                        .toggle_target_reaction(Domain::Salary, id, &user, reaction, policy)
                        .await
                })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().unwrap().is_some());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_independent_toggles_keep_counts_in_step() {
        let store = Arc::new(MemoryEngagementStore::new());
        let id = store
            .insert_target(new_target(Domain::Salary, Utc::now()))
            .await
            .unwrap()
            .id;

        let mut calls = Vec::new();
        for n in 0..32 {
            calls.push((format!("u{n}"), Reaction::Like));
            if n % 2 == 0 {
                calls.push((format!("u{n}"), Reaction::Dislike));
            }
        }
        // an even number of toggles from one user cancels out
        calls.extend((0..10).map(|_| ("flipper".to_string(), Reaction::Like)));
        toggle_concurrently(&store, id, calls, ReactionPolicy::Independent).await;

        let row = store.get_target(Domain::Salary, id).await.unwrap().unwrap();
        assert_eq!(row.reactions.like_count, 32);
        assert_eq!(row.reactions.dislike_count, 16);
        assert!(!row.reactions.has(Reaction::Like, "flipper"));
        assert!(row.reactions.is_consistent());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_exclusive_toggles_leave_each_user_in_one_set() {
        let store = Arc::new(MemoryEngagementStore::new());
        let id = store
            .insert_target(new_target(Domain::Salary, Utc::now()))
            .await
            .unwrap()
            .id;

        let calls = (0..24)
            .flat_map(|n| [(format!("u{n}"), Reaction::Like), (format!("u{n}"), Reaction::Dislike)])
            .collect();
        toggle_concurrently(&store, id, calls, ReactionPolicy::Exclusive).await;

        let row = store.get_target(Domain::Salary, id).await.unwrap().unwrap();
        let reactions = &row.reactions;
        assert!(reactions.is_consistent());
        assert_eq!(reactions.like_count + reactions.dislike_count, 24);
        for n in 0..24 {
            let user = format!("u{n}");
            assert!(reactions.has(Reaction::Like, &user) != reactions.has(Reaction::Dislike, &user));
        }
    }
}
