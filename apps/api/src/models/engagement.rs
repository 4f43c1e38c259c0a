use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::engagement::collections::Domain;
use crate::engagement::reactions::Reactions;

/// A community document (interview experience, referral, resume template,
/// salary entry). Domain-specific fields travel in `data`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TargetRow {
    pub id: Uuid,
    pub domain: String,
    pub author_id: String,
    pub title: String,
    pub data: Value,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub reactions: Reactions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommentRow {
    pub id: Uuid,
    pub domain: String,
    pub parent_id: Uuid,
    pub author_id: String,
    pub content: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub reactions: Reactions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTarget {
    pub id: Uuid,
    pub domain: Domain,
    pub author_id: String,
    pub title: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub id: Uuid,
    pub domain: Domain,
    pub parent_id: Uuid,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<NewTarget> for TargetRow {
    fn from(t: NewTarget) -> Self {
        TargetRow {
            id: t.id,
            domain: t.domain.as_str().to_string(),
            author_id: t.author_id,
            title: t.title,
            data: t.data,
            reactions: Reactions::default(),
            created_at: t.created_at,
            updated_at: t.created_at,
        }
    }
}

impl From<NewComment> for CommentRow {
    fn from(c: NewComment) -> Self {
        CommentRow {
            id: c.id,
            domain: c.domain.as_str().to_string(),
            parent_id: c.parent_id,
            author_id: c.author_id,
            content: c.content,
            reactions: Reactions::default(),
            created_at: c.created_at,
            updated_at: c.created_at,
        }
    }
}
