use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Site settings; the table holds exactly one row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub site_name: String,
    pub site_logo_url: Option<String>,
    pub hero_banner_url: Option<String>,
    pub whatsapp_number: Option<String>,
    pub qris_image_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub payment_instructions: Option<String>,
    pub webhook_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
