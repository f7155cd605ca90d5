use crate::models::*;
use crate::services::ArticleService;
use crate::utils::{Resource, authorize};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/articles",
    tag = "article",
    params(ListQuery),
    responses(
        (status = 200, description = "Published articles, newest first", body = [ArticleSummary])
    )
)]
pub async fn list_articles(
    article_service: web::Data<ArticleService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match article_service.list_published(query.limit).await {
        Ok(articles) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": articles
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/articles/{id}",
    tag = "article",
    params(("id" = Uuid, Path, description = "Article id")),
    responses(
        (status = 200, description = "Published article", body = ArticleResponse),
        (status = 404, description = "Unknown or unpublished article")
    )
)]
pub async fn get_article(
    article_service: web::Data<ArticleService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match article_service.get_published(path.into_inner()).await {
        Ok(article) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": article
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/articles/all",
    tag = "article",
    params(PaginationParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All articles including drafts"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_all_articles(
    article_service: web::Data<ArticleService>,
    session: SessionContext,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Articles) {
        return Ok(e.error_response());
    }

    match article_service.list_all(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/articles",
    tag = "article",
    request_body = UpsertArticleRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Created", body = ArticleResponse),
        (status = 400, description = "Title and content are required"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_article(
    article_service: web::Data<ArticleService>,
    session: SessionContext,
    request: web::Json<UpsertArticleRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Articles) {
        return Ok(e.error_response());
    }

    match article_service
        .create_article(session.user_id, request.into_inner())
        .await
    {
        Ok(article) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": article
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/articles/{id}",
    tag = "article",
    params(("id" = Uuid, Path, description = "Article id")),
    request_body = UpsertArticleRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated", body = ArticleResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Unknown article")
    )
)]
pub async fn update_article(
    article_service: web::Data<ArticleService>,
    session: SessionContext,
    path: web::Path<Uuid>,
    request: web::Json<UpsertArticleRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Articles) {
        return Ok(e.error_response());
    }

    match article_service
        .update_article(path.into_inner(), request.into_inner())
        .await
    {
        Ok(article) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": article
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/articles/{id}",
    tag = "article",
    params(("id" = Uuid, Path, description = "Article id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Unknown article")
    )
)]
pub async fn delete_article(
    article_service: web::Data<ArticleService>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if let Err(e) = authorize(&session, Resource::Articles) {
        return Ok(e.error_response());
    }

    match article_service.delete_article(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Article deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn article_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/articles")
            .route("", web::get().to(list_articles))
            .route("", web::post().to(create_article))
            .route("/all", web::get().to(list_all_articles))
            .route("/{id}", web::get().to(get_article))
            .route("/{id}", web::put().to(update_article))
            .route("/{id}", web::delete().to(delete_article)),
    );
}
