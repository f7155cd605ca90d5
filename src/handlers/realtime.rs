use crate::models::SessionContext;
use crate::services::{ChangeFeed, WatchedTable};
use crate::utils::{Resource, authorize};
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde::Deserialize;
use tokio_stream::StreamExt;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChangeStreamQuery {
    /// Only events for this table; all tables when omitted
    pub table: Option<WatchedTable>,
}

/// Server-sent events, one `change` event per notification.
#[utoipa::path(
    get,
    path = "/changes",
    tag = "realtime",
    params(ChangeStreamQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "text/event-stream of change events"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn stream_changes(
    change_feed: web::Data<ChangeFeed>,
    session: SessionContext,
    query: web::Query<ChangeStreamQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::RealtimeFeed) {
        return Ok(e.error_response());
    }

    log::info!(
        "User {} subscribed to {:?} changes",
        session.user_id,
        query.table
    );
    let events = change_feed.subscribe(query.table).map(|event| {
        serde_json::to_string(&event)
            .map(|payload| web::Bytes::from(format!("event: change\ndata: {payload}\n\n")))
    });

    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header((CACHE_CONTROL, "no-cache"))
        .streaming(events))
}

pub fn realtime_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/changes", web::get().to(stream_changes));
}
