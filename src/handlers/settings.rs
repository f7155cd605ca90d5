use crate::models::*;
use crate::services::SettingsService;
use crate::utils::{Resource, authorize};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    responses(
        (status = 200, description = "Public site settings", body = PublicSettingsResponse)
    )
)]
pub async fn public_settings(settings_service: web::Data<SettingsService>) -> Result<HttpResponse> {
    match settings_service.get_public().await {
        Ok(settings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": settings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/settings/admin",
    tag = "settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All settings including the webhook URL", body = SettingsResponse),
        (status = 403, description = "Admins only")
    )
)]
pub async fn get_settings(
    settings_service: web::Data<SettingsService>,
    session: SessionContext,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Settings) {
        return Ok(e.error_response());
    }

    match settings_service.get_settings().await {
        Ok(settings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": settings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/settings",
    tag = "settings",
    request_body = UpdateSettingsRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated", body = SettingsResponse),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn update_settings(
    settings_service: web::Data<SettingsService>,
    session: SessionContext,
    request: web::Json<UpdateSettingsRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Settings) {
        return Ok(e.error_response());
    }

    match settings_service.update_settings(request.into_inner()).await {
        Ok(settings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": settings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn settings_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/settings")
            .route("", web::get().to(public_settings))
            .route("", web::put().to(update_settings))
            .route("/admin", web::get().to(get_settings)),
    );
}
