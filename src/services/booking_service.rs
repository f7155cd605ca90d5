use crate::config::BookingConfig;
use crate::database::DbPool;
use crate::entities::{
    BookingStatus, booking_entity as bookings, field_entity as fields, settings_entity as settings,
};
use crate::error::{AppError, AppResult};
use crate::external::{WebhookService, whatsapp};
use crate::models::*;
use crate::services::{ChangeFeed, ChangeKind, WatchedTable};
use crate::utils::{end_time_for, ensure_on_schedule, parse_slot_time, validate_phone};
use chrono::{Local, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Event name sent to the settings webhook for new bookings
pub const BOOKING_CREATED_EVENT: &str = "booking.created";

/// A submission that passed every check that needs no database access.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub field_id: Uuid,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_hours: u32,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
}

impl BookingDraft {
    /// Validates the form against the configured day and `today`.
    pub fn validate(req: &CreateBookingRequest, cfg: &BookingConfig, today: NaiveDate) -> AppResult<Self> {
        let customer_name = required(&req.customer_name, "Customer name")?;
        let customer_phone = required(&req.customer_phone, "Customer phone")?;
        validate_phone(&customer_phone)?;

        let customer_email = non_empty(req.customer_email.clone());
        if let Some(email) = &customer_email
            && !email.contains('@')
        {
            return Err(AppError::ValidationError("Invalid email address".to_string()));
        }

        let start_time = parse_slot_time(&req.start_time)?;
        ensure_on_schedule(start_time, cfg.opening_hour, cfg.closing_hour)?;
        let end_time = end_time_for(start_time, req.duration_hours)?;

        if req.booking_date < today {
            return Err(AppError::ValidationError(
                "Booking date is in the past".to_string(),
            ));
        }

        Ok(Self {
            field_id: req.field_id,
            booking_date: req.booking_date,
            start_time,
            end_time,
            duration_hours: req.duration_hours,
            customer_name,
            customer_phone,
            customer_email,
            notes: non_empty(req.notes.clone()),
        })
    }

    /// Row to insert: always `pending`, priced from the field.
    pub fn into_active_model(self, field: &fields::Model, customer_id: Option<Uuid>) -> bookings::ActiveModel {
        let now = Utc::now();
        bookings::ActiveModel {
            id: Set(Uuid::new_v4()),
            field_id: Set(self.field_id),
            customer_id: Set(customer_id),
            booking_date: Set(self.booking_date),
            start_time: Set(self.start_time),
            end_time: Set(self.end_time),
            customer_name: Set(self.customer_name),
            customer_phone: Set(self.customer_phone),
            customer_email: Set(self.customer_email),
            status: Set(BookingStatus::Pending),
            total_amount: Set(field.price_for(self.duration_hours)),
            notes: Set(self.notes),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
        }
    }
}

/// Field id to name for the given bookings. One query, none when empty.
pub(crate) async fn field_names(
    pool: &DatabaseConnection,
    rows: &[bookings::Model],
) -> AppResult<HashMap<Uuid, String>> {
    let mut ids: Vec<Uuid> = rows.iter().map(|b| b.field_id).collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let names = fields::Entity::find()
        .filter(fields::Column::Id.is_in(ids))
        .all(pool)
        .await?
        .into_iter()
        .map(|f| (f.id, f.name))
        .collect();
    Ok(names)
}

pub(crate) async fn with_field_names(
    pool: &DatabaseConnection,
    rows: Vec<bookings::Model>,
) -> AppResult<Vec<BookingResponse>> {
    let names = field_names(pool, &rows).await?;
    Ok(rows
        .into_iter()
        .map(|b| {
            let name = names.get(&b.field_id).cloned();
            BookingResponse::from_model(b, name)
        })
        .collect())
}

#[derive(Clone)]
pub struct BookingService {
    pool: DbPool,
    booking: BookingConfig,
    change_feed: ChangeFeed,
    webhook: WebhookService,
}

impl BookingService {
    pub fn new(
        pool: DbPool,
        booking: BookingConfig,
        change_feed: ChangeFeed,
        webhook: WebhookService,
    ) -> Self {
        Self {
            pool,
            booking,
            change_feed,
            webhook,
        }
    }

    /// Writes one `pending` booking. There is no conflict check here: two
    /// identical submissions both succeed.
    pub async fn submit_booking(
        &self,
        customer_id: Option<Uuid>,
        req: CreateBookingRequest,
    ) -> AppResult<BookingResponse> {
        let draft = BookingDraft::validate(&req, &self.booking, Local::now().date_naive())?;

        let field = fields::Entity::find_by_id(draft.field_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Field not found".to_string()))?;
        if !field.is_active {
            return Err(AppError::ValidationError(
                "Field is not open for booking".to_string(),
            ));
        }

        let created = draft
            .into_active_model(&field, customer_id)
            .insert(self.pool.as_ref())
            .await?;
        log::info!(
            "Booking {} created for field {} on {} at {}",
            created.id,
            field.name,
            created.booking_date,
            created.start_time
        );

        let response = BookingResponse::from_model(created, Some(field.name));
        self.change_feed.publish(WatchedTable::Bookings, ChangeKind::Insert);
        self.notify_webhook(&response).await;
        Ok(response)
    }

    async fn notify_webhook(&self, booking: &BookingResponse) {
        match settings::Entity::find().one(self.pool.as_ref()).await {
            Ok(Some(s)) => {
                if let Some(url) = s.webhook_url {
                    self.webhook.dispatch(url, BOOKING_CREATED_EVENT, booking);
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("Skipping booking webhook, settings unavailable: {e:?}"),
        }
    }

    async fn find(&self, id: Uuid) -> AppResult<bookings::Model> {
        bookings::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
    }

    /// Booking, field name and payment instructions for the confirmation page.
    pub async fn payment_details(&self, id: Uuid) -> AppResult<PaymentDetailsResponse> {
        let booking = self.find(id).await?;
        let field_name = fields::Entity::find_by_id(booking.field_id)
            .one(self.pool.as_ref())
            .await?
            .map(|f| f.name);
        let booking = BookingResponse::from_model(booking, field_name);

        let site = settings::Entity::find().one(self.pool.as_ref()).await?;
        let payment = site.as_ref().map(PaymentSettings::from).unwrap_or(PaymentSettings {
            qris_image_url: None,
            payment_instructions: None,
            whatsapp_number: None,
        });

        let whatsapp_url = match payment.whatsapp_number.as_deref() {
            Some(number) => {
                let message = whatsapp::confirmation_message(&booking);
                match whatsapp::chat_link(number, &message) {
                    Ok(link) => Some(link),
                    Err(e) => {
                        log::warn!("Unusable WhatsApp number in settings: {e:?}");
                        None
                    }
                }
            }
            None => None,
        };

        Ok(PaymentDetailsResponse {
            booking,
            payment,
            whatsapp_url,
        })
    }

    /// Staff list: newest date first, then latest start time.
    pub async fn list_bookings(&self, query: &BookingQuery) -> AppResult<PaginatedResponse<BookingResponse>> {
        let status = query.status_filter()?;
        let rows = bookings::Entity::find()
            .apply_if(status, |q, s| q.filter(bookings::Column::Status.eq(s)))
            .order_by_desc(bookings::Column::BookingDate)
            .order_by_desc(bookings::Column::StartTime)
            .all(self.pool.as_ref())
            .await?;

        let mut items = with_field_names(&self.pool, rows).await?;
        if let Some(needle) = query.needle() {
            items.retain(|b| {
                b.customer_name.to_lowercase().contains(&needle)
                    || b.customer_phone.to_lowercase().contains(&needle)
                    || b.field_name
                        .as_deref()
                        .is_some_and(|f| f.to_lowercase().contains(&needle))
            });
        }

        let params = PaginationParams::new(query.page, query.page_size);
        Ok(params.paginate(items))
    }

    /// Any status may move to any other.
    pub async fn update_status(&self, id: Uuid, status: BookingStatus) -> AppResult<BookingResponse> {
        let current = self.find(id).await?;
        let previous = current.status;

        let mut model = current.into_active_model();
        model.status = Set(status);
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(self.pool.as_ref()).await?;
        log::info!("Booking {id} status {previous} -> {status}");

        self.change_feed.publish(WatchedTable::Bookings, ChangeKind::Update);
        let mut list = with_field_names(&self.pool, vec![updated]).await?;
        list.pop()
            .ok_or_else(|| AppError::InternalError("updated booking vanished".to_string()))
    }

    /// The caller's own bookings, most recent first.
    pub async fn customer_bookings(&self, customer_id: Uuid, limit: Option<u64>) -> AppResult<Vec<BookingResponse>> {
        let mut query = bookings::Entity::find()
            .filter(bookings::Column::CustomerId.eq(customer_id))
            .order_by_desc(bookings::Column::BookingDate)
            .order_by_desc(bookings::Column::StartTime);
        if let Some(n) = limit {
            query = query.limit(n);
        }
        let rows = query.all(self.pool.as_ref()).await?;
        with_field_names(&self.pool, rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebhookConfig;
    use chrono::Duration;
    use sea_orm::{ActiveValue, DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn t(raw: &str) -> NaiveTime {
        parse_slot_time(raw).unwrap()
    }

    fn tomorrow() -> NaiveDate {
        Local::now().date_naive() + Duration::days(1)
    }

    fn field(price: i64) -> fields::Model {
        fields::Model {
            id: Uuid::new_v4(),
            name: "Court A".into(),
            description: None,
            price_per_hour: price,
            image_url: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn request(field_id: Uuid, start: &str, duration: u32) -> CreateBookingRequest {
        CreateBookingRequest {
            field_id,
            booking_date: tomorrow(),
            start_time: start.into(),
            duration_hours: duration,
            customer_name: "Budi".into(),
            customer_phone: "081234567890".into(),
            customer_email: None,
            notes: None,
        }
    }

    fn stored(req: &CreateBookingRequest, f: &fields::Model) -> bookings::Model {
        let start = t(&req.start_time);
        bookings::Model {
            id: Uuid::new_v4(),
            field_id: f.id,
            customer_id: None,
            booking_date: req.booking_date,
            start_time: start,
            end_time: end_time_for(start, req.duration_hours).unwrap(),
            customer_name: req.customer_name.clone(),
            customer_phone: req.customer_phone.clone(),
            customer_email: None,
            status: BookingStatus::Pending,
            total_amount: f.price_for(req.duration_hours),
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn settings_row() -> settings::Model {
        settings::Model {
            id: Uuid::nil(),
            site_name: "Padel Court".into(),
            site_logo_url: None,
            hero_banner_url: None,
            whatsapp_number: Some("081234567890".into()),
            qris_image_url: Some("https://cdn.example.com/qris.png".into()),
            payment_instructions: Some("Scan the QR code".into()),
            webhook_url: None,
            updated_at: None,
        }
    }

    fn service(db: DbPool) -> BookingService {
        BookingService::new(
            db,
            BookingConfig::default(),
            ChangeFeed::new(8),
            WebhookService::new(&WebhookConfig::default()).unwrap(),
        )
    }

    #[test]
    fn test_draft_computes_end_time_and_total() {
        let f = field(150_000);
        let draft = BookingDraft::validate(&request(f.id, "14:00", 2), &BookingConfig::default(), tomorrow())
            .unwrap();
        assert_eq!(draft.end_time, t("16:00"));

        let row = draft.into_active_model(&f, None);
        assert_eq!(row.end_time, ActiveValue::Set(t("16:00")));
        assert_eq!(row.total_amount, ActiveValue::Set(300_000));
        assert_eq!(row.status, ActiveValue::Set(BookingStatus::Pending));
    }

    #[test]
    fn test_draft_rejections() {
        let cfg = BookingConfig::default();
        let today = tomorrow();
        let id = Uuid::new_v4();

        let mut past = request(id, "10:00", 1);
        past.booking_date = today - Duration::days(1);
        let mut no_phone = request(id, "10:00", 1);
        no_phone.customer_phone = " ".into();
        let mut bad_email = request(id, "10:00", 1);
        bad_email.customer_email = Some("budi.example.com".into());

        for req in [
            past,
            no_phone,
            bad_email,
            request(id, "06:00", 1),
            request(id, "10:30", 1),
            request(id, "22:00", 2),
            request(id, "10:00", 5),
        ] {
            assert!(
                matches!(BookingDraft::validate(&req, &cfg, today), Err(AppError::ValidationError(_))),
                "{req:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_name_blocks_before_any_read_or_write() {
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres).into_connection().into();
        let svc = service(db.clone());
        let mut req = request(Uuid::new_v4(), "10:00", 1);
        req.customer_name = "".into();

        let result = svc.submit_booking(None, req).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        drop(svc);
        let db = Arc::try_unwrap(db).ok().expect("service dropped");
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_identical_submissions_both_succeed() {
        let f = field(100_000);
        let req = request(f.id, "10:00", 1);
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[f.clone()]])
            .append_query_results([[stored(&req, &f)]])
            .append_query_results([[settings_row()]])
            .append_query_results([[f.clone()]])
            .append_query_results([[stored(&req, &f)]])
            .append_query_results([[settings_row()]])
            .into_connection()
            .into();
        let svc = service(db);

        let first = svc.submit_booking(None, req.clone()).await.unwrap();
        let second = svc.submit_booking(None, req).await.unwrap();

        assert_eq!(first.start_time, "10:00");
        assert_eq!(second.start_time, "10:00");
        assert_eq!(first.booking_date, second.booking_date);
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_inactive_field_rejected() {
        let mut f = field(100_000);
        f.is_active = false;
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[f.clone()]])
            .into_connection()
            .into();
        let svc = service(db);
        let result = svc.submit_booking(None, request(f.id, "10:00", 1)).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_any_status_transition_is_allowed() {
        let f = field(100_000);
        let req = request(f.id, "10:00", 1);
        let mut paid = stored(&req, &f);
        paid.status = BookingStatus::Paid;
        let mut back_to_pending = paid.clone();
        back_to_pending.status = BookingStatus::Pending;

        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[paid.clone()]])
            .append_query_results([[back_to_pending.clone()]])
            .append_query_results([[f.clone()]])
            .into_connection()
            .into();
        let svc = service(db);

        let updated = svc
            .update_status(paid.id, BookingStatus::Pending)
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Pending);
        assert_eq!(updated.field_name.as_deref(), Some("Court A"));
    }

    #[tokio::test]
    async fn test_list_bookings_searches_field_name() {
        let a = field(100_000);
        let mut b = field(100_000);
        b.name = "Panoramic".into();
        let first = stored(&request(a.id, "10:00", 1), &a);
        let second = stored(&request(b.id, "11:00", 1), &b);

        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[first, second]])
            .append_query_results([[a, b]])
            .into_connection()
            .into();
        let svc = service(db);

        let query = BookingQuery {
            search: Some("panoRAMIC".into()),
            ..Default::default()
        };
        let page = svc.list_bookings(&query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].field_name.as_deref(), Some("Panoramic"));
    }

    #[tokio::test]
    async fn test_payment_details_builds_whatsapp_link() {
        let f = field(100_000);
        let booking = stored(&request(f.id, "14:00", 2), &f);
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[booking.clone()]])
            .append_query_results([[f.clone()]])
            .append_query_results([[settings_row()]])
            .into_connection()
            .into();
        let svc = service(db);

        let details = svc.payment_details(booking.id).await.unwrap();
        assert_eq!(details.booking.total_amount, 200_000);
        assert_eq!(details.payment.payment_instructions.as_deref(), Some("Scan the QR code"));
        let link = details.whatsapp_url.unwrap();
        assert!(link.starts_with("https://wa.me/6281234567890?text="));
        assert!(link.contains("Court%20A"));
    }
}
