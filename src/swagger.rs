use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::SlotPolicy;
use crate::entities::{BookingStatus, UserRole};
use crate::handlers;
use crate::models::*;
use crate::services::{ChangeEvent, ChangeKind, WatchedTable};
use crate::utils::Resource;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::landing::landing,
        handlers::field::list_fields,
        handlers::field::get_field,
        handlers::field::field_availability,
        handlers::field::list_all_fields,
        handlers::field::create_field,
        handlers::field::update_field,
        handlers::field::delete_field,
        handlers::booking::create_booking,
        handlers::booking::payment_details,
        handlers::booking::list_bookings,
        handlers::booking::update_booking_status,
        handlers::booking::my_bookings,
        handlers::article::list_articles,
        handlers::article::get_article,
        handlers::article::list_all_articles,
        handlers::article::create_article,
        handlers::article::update_article,
        handlers::article::delete_article,
        handlers::settings::public_settings,
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::profile::get_profile,
        handlers::profile::update_profile,
        handlers::profile::list_users,
        handlers::profile::update_user_role,
        handlers::dashboard::customer_dashboard,
        handlers::dashboard::cashier_dashboard,
        handlers::dashboard::admin_dashboard,
        handlers::dashboard::financial_report,
        handlers::session::start_session,
        handlers::session::get_session,
        handlers::session::end_session,
        handlers::realtime::stream_changes,
    ),
    components(
        schemas(
            ApiError,
            BookingStatus,
            UserRole,
            SlotPolicy,
            Resource,
            WatchedTable,
            ChangeKind,
            ChangeEvent,
            FieldResponse,
            UpsertFieldRequest,
            CreateBookingRequest,
            BookingResponse,
            UpdateBookingStatusRequest,
            SlotAvailability,
            AvailabilityResponse,
            PaymentSettings,
            PaymentDetailsResponse,
            ArticleResponse,
            ArticleSummary,
            UpsertArticleRequest,
            PublicSettingsResponse,
            SettingsResponse,
            UpdateSettingsRequest,
            ProfileResponse,
            UpdateProfileRequest,
            UpdateRoleRequest,
            LandingResponse,
            CustomerDashboard,
            CashierDashboard,
            DailyRevenue,
            AdminDashboard,
            ReportPeriod,
            FinancialBucket,
            FinancialReport,
            SessionContext,
            NavigationEntry,
            SessionResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "landing", description = "Storefront landing page"),
        (name = "field", description = "Courts and slot availability"),
        (name = "booking", description = "Booking submission, payment and management"),
        (name = "article", description = "Articles"),
        (name = "settings", description = "Site settings"),
        (name = "profile", description = "Profiles and roles"),
        (name = "dashboard", description = "Dashboards and financial report"),
        (name = "session", description = "Session lifecycle"),
        (name = "realtime", description = "Change notifications"),
    ),
    info(
        title = "Padel Court Booking API",
        version = "1.0.0",
        description = "Booking storefront and staff dashboards"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
