use crate::database::DbPool;
use crate::entities::article_entity as articles;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{ChangeFeed, ChangeKind, WatchedTable};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct ArticleService {
    pool: DbPool,
    change_feed: ChangeFeed,
}

impl ArticleService {
    pub fn new(pool: DbPool, change_feed: ChangeFeed) -> Self {
        Self { pool, change_feed }
    }

    /// Published articles, newest first.
    pub async fn list_published(&self, limit: Option<u64>) -> AppResult<Vec<ArticleSummary>> {
        let mut query = articles::Entity::find()
            .filter(articles::Column::IsPublished.eq(true))
            .order_by_desc(articles::Column::CreatedAt);
        if let Some(n) = limit {
            query = query.limit(n);
        }
        let rows = query.all(self.pool.as_ref()).await?;
        Ok(rows.into_iter().map(ArticleSummary::from).collect())
    }

    pub async fn get_published(&self, id: Uuid) -> AppResult<ArticleResponse> {
        articles::Entity::find_by_id(id)
            .filter(articles::Column::IsPublished.eq(true))
            .one(self.pool.as_ref())
            .await?
            .map(ArticleResponse::from)
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))
    }

    /// Drafts included, for staff.
    pub async fn list_all(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<ArticleResponse>> {
        let rows = articles::Entity::find()
            .order_by_desc(articles::Column::CreatedAt)
            .all(self.pool.as_ref())
            .await?;
        Ok(params.paginate(rows.into_iter().map(ArticleResponse::from).collect()))
    }

    async fn find(&self, id: Uuid) -> AppResult<articles::Model> {
        articles::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))
    }

    pub async fn create_article(
        &self,
        author_id: Uuid,
        req: UpsertArticleRequest,
    ) -> AppResult<ArticleResponse> {
        let title = required(&req.title, "Title")?;
        let content = required(&req.content, "Content")?;
        let now = Utc::now();

        let model = articles::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            content: Set(content),
            excerpt: Set(non_empty(req.excerpt)),
            image_url: Set(non_empty(req.image_url)),
            is_published: Set(req.is_published),
            author_id: Set(Some(author_id)),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        }
        .insert(self.pool.as_ref())
        .await?;

        self.change_feed.publish(WatchedTable::Articles, ChangeKind::Insert);
        Ok(model.into())
    }

    /// Authorship is kept as it was on create.
    pub async fn update_article(&self, id: Uuid, req: UpsertArticleRequest) -> AppResult<ArticleResponse> {
        let title = required(&req.title, "Title")?;
        let content = required(&req.content, "Content")?;

        let mut model = self.find(id).await?.into_active_model();
        model.title = Set(title);
        model.content = Set(content);
        model.excerpt = Set(non_empty(req.excerpt));
        model.image_url = Set(non_empty(req.image_url));
        model.is_published = Set(req.is_published);
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(self.pool.as_ref()).await?;

        self.change_feed.publish(WatchedTable::Articles, ChangeKind::Update);
        Ok(updated.into())
    }

    pub async fn delete_article(&self, id: Uuid) -> AppResult<()> {
        self.find(id).await?.delete(self.pool.as_ref()).await?;
        self.change_feed.publish(WatchedTable::Articles, ChangeKind::Delete);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn article(published: bool) -> articles::Model {
        articles::Model {
            id: Uuid::new_v4(),
            title: "Padel 101".into(),
            content: "Grip the racket".into(),
            excerpt: None,
            image_url: None,
            is_published: published,
            author_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_title_and_content() {
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres).into_connection().into();
        let svc = ArticleService::new(db, ChangeFeed::new(4));
        let req = UpsertArticleRequest {
            title: "".into(),
            content: "x".into(),
            excerpt: None,
            image_url: None,
            is_published: true,
        };
        assert!(matches!(
            svc.create_article(Uuid::new_v4(), req).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_list_all_paginates() {
        let rows = vec![article(true), article(false), article(true)];
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .into_connection()
            .into();
        let svc = ArticleService::new(db, ChangeFeed::new(4));

        let page = svc
            .list_all(&PaginationParams::new(Some(2), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 1);
    }

    #[tokio::test]
    async fn test_unpublished_article_is_not_found() {
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<articles::Model>::new()])
            .into_connection()
            .into();
        let svc = ArticleService::new(db, ChangeFeed::new(4));
        assert!(matches!(
            svc.get_published(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
