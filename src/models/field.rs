use crate::entities::field_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Rupiah per hour
    pub price_per_hour: i64,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<field_entity::Model> for FieldResponse {
    fn from(m: field_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price_per_hour: m.price_per_hour,
            image_url: m.image_url,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

/// Create and update share one form.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpsertFieldRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_per_hour: i64,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}
