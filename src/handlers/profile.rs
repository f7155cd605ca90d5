use crate::models::*;
use crate::services::{ProfileService, SessionService};
use crate::utils::{Resource, authorize};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/profile",
    tag = "profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = ProfileResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_profile(
    profile_service: web::Data<ProfileService>,
    session: SessionContext,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Profile) {
        return Ok(e.error_response());
    }

    match profile_service.get_profile(session.user_id).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/profile",
    tag = "profile",
    request_body = UpdateProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated", body = ProfileResponse),
        (status = 400, description = "Invalid phone number")
    )
)]
pub async fn update_profile(
    profile_service: web::Data<ProfileService>,
    session_service: web::Data<SessionService>,
    session: SessionContext,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Profile) {
        return Ok(e.error_response());
    }

    match profile_service
        .update_profile(session.user_id, request.into_inner())
        .await
    {
        Ok(profile) => {
            session_service.invalidate_user(session.user_id);
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": profile
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "profile",
    params(PaginationParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All profiles, newest first"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_users(
    profile_service: web::Data<ProfileService>,
    session: SessionContext,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Users) {
        return Ok(e.error_response());
    }

    match profile_service.list_profiles(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/users/{id}/role",
    tag = "profile",
    params(("id" = Uuid, Path, description = "Profile id")),
    request_body = UpdateRoleRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Role changed", body = ProfileResponse),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Unknown profile")
    )
)]
pub async fn update_user_role(
    profile_service: web::Data<ProfileService>,
    session_service: web::Data<SessionService>,
    session: SessionContext,
    path: web::Path<Uuid>,
    request: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Users) {
        return Ok(e.error_response());
    }

    let user_id = path.into_inner();
    match profile_service.update_role(user_id, request.role).await {
        Ok(profile) => {
            // cached sessions of that user still carry the old role
            session_service.invalidate_user(user_id);
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": profile
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn profile_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/profile")
            .route("", web::get().to(get_profile))
            .route("", web::put().to(update_profile)),
    )
    .service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("/{id}/role", web::put().to(update_user_role)),
    );
}
