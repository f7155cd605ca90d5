use crate::database::DbPool;
use crate::entities::field_entity as fields;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{ChangeFeed, ChangeKind, WatchedTable};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, IntoActiveModel,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct FieldService {
    pool: DbPool,
    change_feed: ChangeFeed,
}

struct FieldForm {
    name: String,
    description: Option<String>,
    price_per_hour: i64,
    image_url: Option<String>,
    is_active: bool,
}

fn validate(req: UpsertFieldRequest) -> AppResult<FieldForm> {
    let name = required(&req.name, "Field name")?;
    if req.price_per_hour <= 0 {
        return Err(AppError::ValidationError(
            "Price per hour must be positive".to_string(),
        ));
    }
    Ok(FieldForm {
        name,
        description: non_empty(req.description),
        price_per_hour: req.price_per_hour,
        image_url: non_empty(req.image_url),
        is_active: req.is_active.unwrap_or(true),
    })
}

impl FieldService {
    pub fn new(pool: DbPool, change_feed: ChangeFeed) -> Self {
        Self { pool, change_feed }
    }

    /// Active fields by name, optionally capped (the landing page shows 3).
    pub async fn list_active(&self, limit: Option<u64>) -> AppResult<Vec<FieldResponse>> {
        let mut query = fields::Entity::find()
            .filter(fields::Column::IsActive.eq(true))
            .order_by_asc(fields::Column::Name);
        if let Some(n) = limit {
            query = query.limit(n);
        }
        let rows = query.all(self.pool.as_ref()).await?;
        Ok(rows.into_iter().map(FieldResponse::from).collect())
    }

    /// Every field including inactive ones, newest first.
    pub async fn list_all(&self) -> AppResult<Vec<FieldResponse>> {
        let rows = fields::Entity::find()
            .order_by_desc(fields::Column::CreatedAt)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(FieldResponse::from).collect())
    }

    pub async fn find(&self, id: Uuid) -> AppResult<fields::Model> {
        fields::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Field not found".to_string()))
    }

    pub async fn get_active(&self, id: Uuid) -> AppResult<FieldResponse> {
        let field = self.find(id).await?;
        if !field.is_active {
            return Err(AppError::NotFound("Field not found".to_string()));
        }
        Ok(field.into())
    }

    pub async fn create_field(&self, req: UpsertFieldRequest) -> AppResult<FieldResponse> {
        let form = validate(req)?;
        let now = Utc::now();
        let model = fields::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(form.name),
            description: Set(form.description),
            price_per_hour: Set(form.price_per_hour),
            image_url: Set(form.image_url),
            is_active: Set(form.is_active),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        }
        .insert(self.pool.as_ref())
        .await?;

        self.change_feed.publish(WatchedTable::Fields, ChangeKind::Insert);
        log::info!("Created field {} ({})", model.name, model.id);
        Ok(model.into())
    }

    pub async fn update_field(&self, id: Uuid, req: UpsertFieldRequest) -> AppResult<FieldResponse> {
        let form = validate(req)?;
        let mut model = self.find(id).await?.into_active_model();
        model.name = Set(form.name);
        model.description = Set(form.description);
        model.price_per_hour = Set(form.price_per_hour);
        model.image_url = Set(form.image_url);
        model.is_active = Set(form.is_active);
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(self.pool.as_ref()).await?;

        self.change_feed.publish(WatchedTable::Fields, ChangeKind::Update);
        Ok(updated.into())
    }

    /// Fails while bookings still reference the field.
    pub async fn delete_field(&self, id: Uuid) -> AppResult<()> {
        let field = self.find(id).await?;
        match field.delete(self.pool.as_ref()).await {
            Ok(_) => {
                self.change_feed.publish(WatchedTable::Fields, ChangeKind::Delete);
                log::info!("Deleted field {id}");
                Ok(())
            }
            Err(e) if is_fk_violation(&e) => Err(AppError::ValidationError(
                "Field still has bookings; deactivate it instead".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_fk_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}
