use crate::database::DbPool;
use crate::entities::settings_entity as settings;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{ChangeFeed, ChangeKind, WatchedTable};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};

#[derive(Clone)]
pub struct SettingsService {
    pool: DbPool,
    change_feed: ChangeFeed,
}

impl SettingsService {
    pub fn new(pool: DbPool, change_feed: ChangeFeed) -> Self {
        Self { pool, change_feed }
    }

    /// The singleton row, seeded by the initial migration.
    pub async fn load(&self) -> AppResult<settings::Model> {
        settings::Entity::find()
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Site settings are missing".to_string()))
    }

    pub async fn get_public(&self) -> AppResult<PublicSettingsResponse> {
        Ok(self.load().await?.into())
    }

    pub async fn get_settings(&self) -> AppResult<SettingsResponse> {
        Ok(self.load().await?.into())
    }

    /// Replaces every setting; empty strings are stored as NULL.
    pub async fn update_settings(&self, req: UpdateSettingsRequest) -> AppResult<SettingsResponse> {
        let site_name = required(&req.site_name, "Site name")?;
        if let Some(url) = non_empty(req.webhook_url.clone())
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(AppError::ValidationError(
                "Webhook URL must start with http:// or https://".to_string(),
            ));
        }

        let mut model = self.load().await?.into_active_model();
        model.site_name = Set(site_name);
        model.site_logo_url = Set(non_empty(req.site_logo_url));
        model.hero_banner_url = Set(non_empty(req.hero_banner_url));
        model.whatsapp_number = Set(non_empty(req.whatsapp_number));
        model.qris_image_url = Set(non_empty(req.qris_image_url));
        model.payment_instructions = Set(non_empty(req.payment_instructions));
        model.webhook_url = Set(non_empty(req.webhook_url));
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(self.pool.as_ref()).await?;

        self.change_feed.publish(WatchedTable::Settings, ChangeKind::Update);
        log::info!("Site settings updated");
        Ok(updated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    fn row(webhook: Option<&str>) -> settings::Model {
        settings::Model {
            id: Uuid::nil(),
            site_name: "Padel Court".into(),
            site_logo_url: None,
            hero_banner_url: None,
            whatsapp_number: Some("081234567890".into()),
            qris_image_url: None,
            payment_instructions: None,
            webhook_url: webhook.map(str::to_string),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_public_view_hides_webhook() {
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[row(Some("https://hooks.example.com/x"))]])
            .into_connection()
            .into();
        let svc = SettingsService::new(db, ChangeFeed::new(4));

        let public = svc.get_public().await.unwrap();
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("webhook_url").is_none());
        assert_eq!(json["site_name"], "Padel Court");
    }

    #[tokio::test]
    async fn test_update_rejects_blank_site_name() {
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres).into_connection().into();
        let svc = SettingsService::new(db, ChangeFeed::new(4));
        let req = UpdateSettingsRequest {
            site_name: "  ".into(),
            site_logo_url: None,
            hero_banner_url: None,
            whatsapp_number: None,
            qris_image_url: None,
            payment_instructions: None,
            webhook_url: None,
        };
        assert!(matches!(
            svc.update_settings(req).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_update_stores_empty_strings_as_null() {
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[row(Some("https://old.example.com"))]])
            .append_query_results([[row(None)]])
            .into_connection()
            .into();
        let svc = SettingsService::new(db, ChangeFeed::new(4));
        let req = UpdateSettingsRequest {
            site_name: "Padel Court".into(),
            site_logo_url: Some("".into()),
            hero_banner_url: None,
            whatsapp_number: Some("081234567890".into()),
            qris_image_url: None,
            payment_instructions: Some(" ".into()),
            webhook_url: Some("".into()),
        };

        let updated = svc.update_settings(req).await.unwrap();
        assert_eq!(updated.webhook_url, None);
    }
}
