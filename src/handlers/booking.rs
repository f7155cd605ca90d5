use crate::models::*;
use crate::services::BookingService;
use crate::utils::{Resource, authorize};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/bookings",
    tag = "booking",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking created as pending", body = BookingResponse),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "Unknown field")
    )
)]
pub async fn create_booking(
    booking_service: web::Data<BookingService>,
    session: Option<SessionContext>,
    request: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse> {
    let customer_id = session.map(|s| s.user_id);

    match booking_service
        .submit_booking(customer_id, request.into_inner())
        .await
    {
        Ok(booking) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": booking
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/bookings/{id}/payment",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking with payment instructions", body = PaymentDetailsResponse),
        (status = 404, description = "Unknown booking")
    )
)]
pub async fn payment_details(
    booking_service: web::Data<BookingService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match booking_service.payment_details(path.into_inner()).await {
        Ok(details) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": details
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/bookings",
    tag = "booking",
    params(BookingQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paged bookings with field names"),
        (status = 400, description = "Unknown status filter"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_bookings(
    booking_service: web::Data<BookingService>,
    session: SessionContext,
    query: web::Query<BookingQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::ManageBookings) {
        return Ok(e.error_response());
    }

    match booking_service.list_bookings(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/bookings/{id}/status",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Booking id")),
    request_body = UpdateBookingStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Status changed", body = BookingResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Unknown booking")
    )
)]
pub async fn update_booking_status(
    booking_service: web::Data<BookingService>,
    session: SessionContext,
    path: web::Path<Uuid>,
    request: web::Json<UpdateBookingStatusRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::ManageBookings) {
        return Ok(e.error_response());
    }

    match booking_service
        .update_status(path.into_inner(), request.status)
        .await
    {
        Ok(booking) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": booking
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/bookings/mine",
    tag = "booking",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's bookings, most recent first", body = [BookingResponse]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn my_bookings(
    booking_service: web::Data<BookingService>,
    session: SessionContext,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::OwnBookings) {
        return Ok(e.error_response());
    }

    match booking_service.customer_bookings(session.user_id, None).await {
        Ok(bookings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": bookings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn booking_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::post().to(create_booking))
            .route("", web::get().to(list_bookings))
            .route("/mine", web::get().to(my_bookings))
            .route("/{id}/payment", web::get().to(payment_details))
            .route("/{id}/status", web::put().to(update_booking_status)),
    );
}
