use crate::models::{ArticleSummary, FieldResponse, PublicSettingsResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of fields and articles featured on the landing page
pub const LANDING_ITEMS: u64 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LandingResponse {
    pub settings: PublicSettingsResponse,
    pub fields: Vec<FieldResponse>,
    pub articles: Vec<ArticleSummary>,
}
