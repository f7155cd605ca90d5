use crate::models::*;
use crate::services::{AvailabilityService, FieldService};
use crate::utils::{Resource, authorize};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/fields",
    tag = "field",
    params(ListQuery),
    responses(
        (status = 200, description = "Active fields", body = [FieldResponse])
    )
)]
pub async fn list_fields(
    field_service: web::Data<FieldService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match field_service.list_active(query.limit).await {
        Ok(fields) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": fields
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/fields/{id}",
    tag = "field",
    params(("id" = Uuid, Path, description = "Field id")),
    responses(
        (status = 200, description = "Field", body = FieldResponse),
        (status = 404, description = "Unknown or inactive field")
    )
)]
pub async fn get_field(
    field_service: web::Data<FieldService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match field_service.get_active(path.into_inner()).await {
        Ok(field) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": field
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/fields/{id}/availability",
    tag = "field",
    params(
        ("id" = Uuid, Path, description = "Field id"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Hourly slots with availability", body = AvailabilityResponse),
        (status = 404, description = "Unknown field"),
        (status = 500, description = "Bookings could not be read; retry")
    )
)]
pub async fn field_availability(
    availability_service: web::Data<AvailabilityService>,
    path: web::Path<Uuid>,
    query: web::Query<AvailabilityQuery>,
) -> Result<HttpResponse> {
    match availability_service
        .check_availability(path.into_inner(), query.date)
        .await
    {
        Ok(availability) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": availability
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/fields/all",
    tag = "field",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every field, newest first", body = [FieldResponse]),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_all_fields(
    field_service: web::Data<FieldService>,
    session: SessionContext,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Fields) {
        return Ok(e.error_response());
    }

    match field_service.list_all().await {
        Ok(fields) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": fields
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/fields",
    tag = "field",
    request_body = UpsertFieldRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Created", body = FieldResponse),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Admins only")
    )
)]
pub async fn create_field(
    field_service: web::Data<FieldService>,
    session: SessionContext,
    request: web::Json<UpsertFieldRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Fields) {
        return Ok(e.error_response());
    }

    match field_service.create_field(request.into_inner()).await {
        Ok(field) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": field
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/fields/{id}",
    tag = "field",
    params(("id" = Uuid, Path, description = "Field id")),
    request_body = UpsertFieldRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated", body = FieldResponse),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Unknown field")
    )
)]
pub async fn update_field(
    field_service: web::Data<FieldService>,
    session: SessionContext,
    path: web::Path<Uuid>,
    request: web::Json<UpsertFieldRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Fields) {
        return Ok(e.error_response());
    }

    match field_service
        .update_field(path.into_inner(), request.into_inner())
        .await
    {
        Ok(field) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": field
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/fields/{id}",
    tag = "field",
    params(("id" = Uuid, Path, description = "Field id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Field still has bookings"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Unknown field")
    )
)]
pub async fn delete_field(
    field_service: web::Data<FieldService>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Fields) {
        return Ok(e.error_response());
    }

    match field_service.delete_field(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Field deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn field_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/fields")
            .route("", web::get().to(list_fields))
            .route("", web::post().to(create_field))
            .route("/all", web::get().to(list_all_fields))
            .route("/{id}", web::get().to(get_field))
            .route("/{id}", web::put().to(update_field))
            .route("/{id}", web::delete().to(delete_field))
            .route("/{id}/availability", web::get().to(field_availability)),
    );
}
