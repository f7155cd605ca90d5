use crate::database::DbPool;
use crate::entities::{UserRole, profile_entity as profiles};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::validate_phone;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, EntityTrait, FromQueryResult, IntoActiveModel,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileService {
    pool: DbPool,
}

impl ProfileService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find(&self, user_id: Uuid) -> AppResult<profiles::Model> {
        profiles::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<ProfileResponse> {
        Ok(self.find(user_id).await?.into())
    }

    /// Caller edits their own name and phone; blank values clear them.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> AppResult<ProfileResponse> {
        let phone = non_empty(req.phone);
        if let Some(p) = &phone {
            validate_phone(p)?;
        }

        let mut model = self.find(user_id).await?.into_active_model();
        model.full_name = Set(non_empty(req.full_name));
        model.phone = Set(phone);
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(self.pool.as_ref()).await?;
        Ok(updated.into())
    }

    /// All profiles, newest first.
    pub async fn list_profiles(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<ProfileResponse>> {
        #[derive(Debug, FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let total = profiles::Entity::find()
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(self.pool.as_ref())
            .await?
            .map(|r| r.count)
            .unwrap_or(0);

        let rows = profiles::Entity::find()
            .order_by_desc(profiles::Column::CreatedAt)
            .offset(params.offset())
            .limit(params.page_size())
            .all(self.pool.as_ref())
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(ProfileResponse::from).collect(),
            params.page(),
            params.page_size(),
            total.max(0) as u64,
        ))
    }

    pub async fn update_role(&self, user_id: Uuid, role: UserRole) -> AppResult<ProfileResponse> {
        let mut model = self.find(user_id).await?.into_active_model();
        model.role = Set(role);
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(self.pool.as_ref()).await?;
        log::info!("Role of user {user_id} set to {role}");
        Ok(updated.into())
    }
}
