use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;
use std::time::Duration;

use padel_backend::{
    config::{Config, SlotPolicy},
    database::{create_pool, run_migrations},
    external::WebhookService,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    match config.booking.slot_policy {
        SlotPolicy::ExactStart => log::info!(
            "Slot policy exact_start: only a booking starting at a slot blocks it"
        ),
        SlotPolicy::Overlap => log::warn!(
            "Slot policy overlap: every hour covered by a booking is blocked"
        ),
    }

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.leeway_secs);
    let webhook_service =
        WebhookService::new(&config.webhook).expect("Failed to build webhook HTTP client");
    let change_feed = ChangeFeed::new(config.realtime.channel_capacity);

    let session_service = SessionService::new(pool.clone());
    let profile_service = ProfileService::new(pool.clone());
    let field_service = FieldService::new(pool.clone(), change_feed.clone());
    let article_service = ArticleService::new(pool.clone(), change_feed.clone());
    let settings_service = SettingsService::new(pool.clone(), change_feed.clone());
    let availability_service = AvailabilityService::new(pool.clone(), config.booking.clone());
    let booking_service = BookingService::new(
        pool.clone(),
        config.booking.clone(),
        change_feed.clone(),
        webhook_service,
    );
    let report_service = ReportService::new(pool.clone());

    tasks::spawn_all(
        ChangePoller::new(pool.clone(), change_feed.clone()),
        &change_feed,
        Duration::from_secs(config.realtime.poll_interval_secs.max(1)),
    );

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(
                jwt_service.clone(),
                session_service.clone(),
            ))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(web::Data::new(session_service.clone()))
            .app_data(web::Data::new(profile_service.clone()))
            .app_data(web::Data::new(field_service.clone()))
            .app_data(web::Data::new(article_service.clone()))
            .app_data(web::Data::new(settings_service.clone()))
            .app_data(web::Data::new(availability_service.clone()))
            .app_data(web::Data::new(booking_service.clone()))
            .app_data(web::Data::new(report_service.clone()))
            .app_data(web::Data::new(change_feed.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::landing_config)
                    .configure(handlers::field_config)
                    .configure(handlers::booking_config)
                    .configure(handlers::article_config)
                    .configure(handlers::settings_config)
                    .configure(handlers::profile_config)
                    .configure(handlers::dashboard_config)
                    .configure(handlers::session_config)
                    .configure(handlers::realtime_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
