use crate::models::*;
use crate::services::ReportService;
use crate::utils::{Resource, authorize};
use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Local;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Customer dashboard", body = CustomerDashboard)
    )
)]
pub async fn customer_dashboard(
    report_service: web::Data<ReportService>,
    session: SessionContext,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Dashboard) {
        return Ok(e.error_response());
    }

    match report_service.customer_dashboard(session.user_id).await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": dashboard
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/dashboard/kasir",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cashier dashboard", body = CashierDashboard),
        (status = 403, description = "Staff only")
    )
)]
pub async fn cashier_dashboard(
    report_service: web::Data<ReportService>,
    session: SessionContext,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::CashierDashboard) {
        return Ok(e.error_response());
    }

    match report_service
        .cashier_dashboard(Local::now().date_naive())
        .await
    {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": dashboard
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/dashboard/admin",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Admin dashboard", body = AdminDashboard),
        (status = 403, description = "Admins only")
    )
)]
pub async fn admin_dashboard(
    report_service: web::Data<ReportService>,
    session: SessionContext,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::AdminDashboard) {
        return Ok(e.error_response());
    }

    match report_service.admin_dashboard(Local::now().date_naive()).await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": dashboard
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/reports/financial",
    tag = "dashboard",
    params(FinancialQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paid revenue per day or month", body = FinancialReport),
        (status = 403, description = "Admins only")
    )
)]
pub async fn financial_report(
    report_service: web::Data<ReportService>,
    session: SessionContext,
    query: web::Query<FinancialQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Finance) {
        return Ok(e.error_response());
    }

    let period = query.period.unwrap_or_default();
    match report_service
        .financial_report(period, Local::now().date_naive())
        .await
    {
        Ok(report) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": report
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn dashboard_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .route("", web::get().to(customer_dashboard))
            .route("/kasir", web::get().to(cashier_dashboard))
            .route("/admin", web::get().to(admin_dashboard)),
    )
    .service(web::scope("/reports").route("/financial", web::get().to(financial_report)));
}
