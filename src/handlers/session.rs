use crate::middlewares::current_claims;
use crate::models::*;
use crate::services::SessionService;
use crate::utils::navigation;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn session_body(session: SessionContext) -> SessionResponse {
    let navigation = navigation(session.role);
    SessionResponse {
        session,
        navigation,
    }
}

#[utoipa::path(
    post,
    path = "/session",
    tag = "session",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session started; profile created on first sign-in", body = SessionResponse),
        (status = 401, description = "Missing, invalid or signed-out token")
    )
)]
pub async fn start_session(
    session_service: web::Data<SessionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(claims) = current_claims(&req) else {
        return Ok(crate::AppError::AuthError("Missing access token".to_string()).error_response());
    };

    match session_service.start(&claims).await {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": session_body(session)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current session and its navigation", body = SessionResponse),
        (status = 401, description = "Missing, invalid or signed-out token")
    )
)]
pub async fn get_session(session: SessionContext) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": session_body(session)
    })))
}

#[utoipa::path(
    delete,
    path = "/session",
    tag = "session",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Signed out"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn end_session(
    session_service: web::Data<SessionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    match current_claims(&req) {
        Some(claims) => {
            session_service.sign_out(&claims);
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Signed out"
            })))
        }
        None => Ok(crate::AppError::AuthError("Missing access token".to_string()).error_response()),
    }
}

pub fn session_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/session")
            .route("", web::post().to(start_session))
            .route("", web::get().to(get_session))
            .route("", web::delete().to(end_session)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbPool;
    use crate::entities::{UserRole, profile_entity as profiles};
    use crate::middlewares::AuthMiddleware;
    use crate::utils::JwtService;
    use actix_web::{App, http::StatusCode, test};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    #[actix_web::test]
    async fn test_session_lifecycle() {
        let user_id = Uuid::new_v4();
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[profiles::Model {
                id: user_id,
                full_name: Some("Sari".into()),
                phone: None,
                role: UserRole::Admin,
                created_at: None,
                updated_at: None,
            }]])
            .into_connection()
            .into();
        let jwt = JwtService::new("secret", 0);
        let sessions = SessionService::new(db);
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt.clone(), sessions.clone()))
                .app_data(web::Data::new(sessions))
                .service(web::scope("/api/v1").configure(session_config)),
        )
        .await;
        let bearer = format!(
            "Bearer {}",
            jwt.generate_access_token(user_id, Some("s1"), 600).unwrap()
        );

        let req = test::TestRequest::post()
            .uri("/api/v1/session")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["session"]["role"], "admin");
        let nav = body["data"]["navigation"].as_array().unwrap();
        assert!(nav.iter().any(|e| e["resource"] == "settings"));

        let req = test::TestRequest::delete()
            .uri("/api/v1/session")
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/v1/session")
            .insert_header(("Authorization", bearer))
            .to_request();
        let err = test::try_call_service(&app, req).await.err().unwrap();
        assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
    }
}
