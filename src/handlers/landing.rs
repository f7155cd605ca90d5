use crate::models::*;
use crate::services::{ArticleService, FieldService, SettingsService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

async fn load_landing(
    settings_service: &SettingsService,
    field_service: &FieldService,
    article_service: &ArticleService,
) -> crate::AppResult<LandingResponse> {
    Ok(LandingResponse {
        settings: settings_service.get_public().await?,
        fields: field_service.list_active(Some(LANDING_ITEMS)).await?,
        articles: article_service.list_published(Some(LANDING_ITEMS)).await?,
    })
}

#[utoipa::path(
    get,
    path = "/landing",
    tag = "landing",
    responses(
        (status = 200, description = "Site settings with featured fields and articles", body = LandingResponse)
    )
)]
pub async fn landing(
    settings_service: web::Data<SettingsService>,
    field_service: web::Data<FieldService>,
    article_service: web::Data<ArticleService>,
) -> Result<HttpResponse> {
    match load_landing(&settings_service, &field_service, &article_service).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn landing_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/landing", web::get().to(landing));
}
