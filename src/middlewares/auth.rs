use crate::error::AppError;
use crate::models::SessionContext;
use crate::services::SessionService;
use crate::utils::{Claims, JwtService};
use actix_web::http::Method;
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, web,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// A route reachable without a token. A valid token sent to a public
/// route is still attached, so the handler can link the caller.
struct PublicRoute {
    method: Option<Method>,
    prefix: &'static str,
    suffix: Option<&'static str>,
    exact: bool,
}

impl PublicRoute {
    fn any(prefix: &'static str) -> Self {
        Self { method: None, prefix, suffix: None, exact: false }
    }

    fn get(prefix: &'static str) -> Self {
        Self { method: Some(Method::GET), prefix, suffix: None, exact: false }
    }

    fn exact(method: Method, path: &'static str) -> Self {
        Self { method: Some(method), prefix: path, suffix: None, exact: true }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        if self.method.as_ref().is_some_and(|m| m != method) {
            return false;
        }
        if self.exact {
            return path == self.prefix;
        }
        path.starts_with(self.prefix) && self.suffix.is_none_or(|s| path.ends_with(s))
    }
}

struct PublicPaths {
    routes: Vec<PublicRoute>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            routes: vec![
                PublicRoute::any("/swagger-ui"),
                PublicRoute::any("/api-docs/"),
                PublicRoute::get("/api/v1/landing"),
                PublicRoute::get("/api/v1/fields"),
                PublicRoute::get("/api/v1/articles"),
                PublicRoute::get("/api/v1/settings"),
                PublicRoute::exact(Method::POST, "/api/v1/bookings"),
                PublicRoute {
                    method: Some(Method::GET),
                    prefix: "/api/v1/bookings/",
                    suffix: Some("/payment"),
                    exact: false,
                },
            ],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        self.routes.iter().any(|r| r.matches(method, path))
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
    session_service: SessionService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService, session_service: SessionService) -> Self {
        Self {
            jwt_service,
            session_service,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            session_service: self.session_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    session_service: SessionService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        let public = self.public_paths.is_public(req.method(), req.path());
        let verified = bearer_token(&req).map(|t| self.jwt_service.verify_access_token(t));

        let claims = match verified {
            Some(Ok(claims)) if self.session_service.is_revoked(&claims) => {
                if public {
                    None
                } else {
                    let error = AppError::AuthError("Session has been signed out".to_string());
                    return Box::pin(async move { Err(error.into()) });
                }
            }
            Some(Ok(claims)) => Some(claims),
            Some(Err(e)) if !public => {
                log::debug!("Rejected token on {}: {e}", req.path());
                let error = AppError::AuthError("Invalid access token".to_string());
                return Box::pin(async move { Err(error.into()) });
            }
            None if !public => {
                let error = AppError::AuthError("Missing access token".to_string());
                return Box::pin(async move { Err(error.into()) });
            }
            // public route with a bad or no token
            _ => None,
        };

        if let Some(claims) = claims {
            req.extensions_mut().insert(claims);
        }
        Box::pin(self.service.call(req))
    }
}

/// Verified claims of the current request, if any.
pub fn current_claims(req: &HttpRequest) -> Option<Claims> {
    req.extensions().get::<Claims>().cloned()
}

/// Resolves the caller's session from the claims the middleware attached.
/// Use `Option<SessionContext>` on routes that also serve anonymous callers.
impl FromRequest for SessionContext {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = current_claims(req);
        let sessions = req.app_data::<web::Data<SessionService>>().cloned();

        Box::pin(async move {
            let claims =
                claims.ok_or_else(|| AppError::AuthError("Missing access token".to_string()))?;
            let sessions = sessions.ok_or_else(|| {
                AppError::InternalError("Session service is not registered".to_string())
            })?;
            Ok(sessions.resolve(&claims).await?)
        })
    }
}
