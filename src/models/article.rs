use crate::entities::article_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub author_id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<article_entity::Model> for ArticleResponse {
    fn from(m: article_entity::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            content: m.content,
            excerpt: m.excerpt,
            image_url: m.image_url,
            is_published: m.is_published,
            author_id: m.author_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Card shown on the landing page and article index; no body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<article_entity::Model> for ArticleSummary {
    fn from(m: article_entity::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            excerpt: m.excerpt,
            image_url: m.image_url,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpsertArticleRequest {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}
