use crate::entities::settings_entity;
use crate::models::PaymentSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Everything the storefront may see. The webhook URL stays admin-only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicSettingsResponse {
    pub site_name: String,
    pub site_logo_url: Option<String>,
    pub hero_banner_url: Option<String>,
    pub whatsapp_number: Option<String>,
    pub qris_image_url: Option<String>,
    pub payment_instructions: Option<String>,
}

impl From<settings_entity::Model> for PublicSettingsResponse {
    fn from(m: settings_entity::Model) -> Self {
        Self {
            site_name: m.site_name,
            site_logo_url: m.site_logo_url,
            hero_banner_url: m.hero_banner_url,
            whatsapp_number: m.whatsapp_number,
            qris_image_url: m.qris_image_url,
            payment_instructions: m.payment_instructions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingsResponse {
    pub site_name: String,
    pub site_logo_url: Option<String>,
    pub hero_banner_url: Option<String>,
    pub whatsapp_number: Option<String>,
    pub qris_image_url: Option<String>,
    pub payment_instructions: Option<String>,
    pub webhook_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<settings_entity::Model> for SettingsResponse {
    fn from(m: settings_entity::Model) -> Self {
        Self {
            site_name: m.site_name,
            site_logo_url: m.site_logo_url,
            hero_banner_url: m.hero_banner_url,
            whatsapp_number: m.whatsapp_number,
            qris_image_url: m.qris_image_url,
            payment_instructions: m.payment_instructions,
            webhook_url: m.webhook_url,
            updated_at: m.updated_at,
        }
    }
}

impl From<&settings_entity::Model> for PaymentSettings {
    fn from(m: &settings_entity::Model) -> Self {
        Self {
            qris_image_url: m.qris_image_url.clone(),
            payment_instructions: m.payment_instructions.clone(),
            whatsapp_number: m.whatsapp_number.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub site_name: String,
    pub site_logo_url: Option<String>,
    pub hero_banner_url: Option<String>,
    pub whatsapp_number: Option<String>,
    pub qris_image_url: Option<String>,
    pub payment_instructions: Option<String>,
    pub webhook_url: Option<String>,
}
