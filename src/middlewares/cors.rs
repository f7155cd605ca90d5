use actix_cors::Cors;

pub fn create_cors() -> Cors {
    Cors::default()
        // storefront and dashboards are served from other origins
        .allowed_origin_fn(|_, _req_head| true)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .expose_headers(vec!["content-type"])
        .supports_credentials()
        .max_age(3600)
}
