//! Read-only aggregations behind the three dashboards and the financial
//! report. Revenue always means the sum of `total_amount` over `paid`
//! bookings, keyed by booking date.

use crate::database::DbPool;
use crate::entities::{
    BookingStatus, booking_entity as bookings, field_entity as fields, profile_entity as profiles,
};
use crate::error::AppResult;
use crate::models::*;
use crate::services::booking_service::with_field_names;
use chrono::{Datelike, Duration, Months, NaiveDate};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const RECENT_BOOKINGS: u64 = 5;
pub const DASHBOARD_DAYS: u32 = 7;
pub const DAILY_REPORT_DAYS: i64 = 30;
pub const MONTHLY_REPORT_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromQueryResult)]
pub struct PaidBooking {
    pub booking_date: NaiveDate,
    pub total_amount: i64,
}

/// Paid revenue for each of the `days` days ending at `today`, oldest
/// first, zero for days without bookings.
pub fn daily_revenue(paid: &[PaidBooking], today: NaiveDate, days: u32) -> Vec<DailyRevenue> {
    (0..days)
        .rev()
        .map(|back| {
            let date = today - Duration::days(i64::from(back));
            let revenue = paid
                .iter()
                .filter(|p| p.booking_date == date)
                .map(|p| p.total_amount)
                .sum();
            DailyRevenue { date, revenue }
        })
        .collect()
}

fn bucket_label(date: NaiveDate, period: ReportPeriod) -> String {
    match period {
        ReportPeriod::Daily => date.format("%Y-%m-%d").to_string(),
        ReportPeriod::Monthly => date.format("%Y-%m").to_string(),
    }
}

/// Groups paid bookings per day or month, ascending by label.
pub fn financial_buckets(paid: &[PaidBooking], period: ReportPeriod) -> Vec<FinancialBucket> {
    let mut grouped: BTreeMap<String, (i64, u64)> = BTreeMap::new();
    for p in paid {
        let entry = grouped.entry(bucket_label(p.booking_date, period)).or_default();
        entry.0 += p.total_amount;
        entry.1 += 1;
    }
    grouped
        .into_iter()
        .map(|(label, (revenue, bookings))| FinancialBucket {
            label,
            revenue,
            bookings,
        })
        .collect()
}

/// First day covered by the report ending at `today`.
pub fn report_start(period: ReportPeriod, today: NaiveDate) -> NaiveDate {
    match period {
        ReportPeriod::Daily => today - Duration::days(DAILY_REPORT_DAYS),
        ReportPeriod::Monthly => {
            let first_of_month = today.with_day(1).unwrap_or(today);
            first_of_month
                .checked_sub_months(Months::new(MONTHLY_REPORT_MONTHS))
                .unwrap_or(first_of_month)
        }
    }
}

pub fn build_report(period: ReportPeriod, today: NaiveDate, paid: &[PaidBooking]) -> FinancialReport {
    let buckets = financial_buckets(paid, period);
    let total_revenue: i64 = buckets.iter().map(|b| b.revenue).sum();
    let total_bookings: u64 = buckets.iter().map(|b| b.bookings).sum();
    let average_revenue = if buckets.is_empty() {
        0
    } else {
        total_revenue / buckets.len() as i64
    };

    FinancialReport {
        period,
        from: report_start(period, today),
        to: today,
        buckets,
        total_revenue,
        total_bookings,
        average_revenue,
    }
}

#[derive(Clone)]
pub struct ReportService {
    pool: DbPool,
}

impl ReportService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn count<E: EntityTrait>(&self, select: Select<E>) -> AppResult<u64> {
        #[derive(Debug, FromQueryResult)]
        struct CountRow {
            count: i64,
        }
        let count = select
            .select_only()
            .column_as(Expr::val(1).count(), "count")
            .into_model::<CountRow>()
            .one(self.pool.as_ref())
            .await?
            .map(|r| r.count)
            .unwrap_or(0);
        Ok(count.max(0) as u64)
    }

    async fn paid_bookings(&self, since: Option<NaiveDate>) -> AppResult<Vec<PaidBooking>> {
        let mut query = bookings::Entity::find()
            .select_only()
            .column(bookings::Column::BookingDate)
            .column(bookings::Column::TotalAmount)
            .filter(bookings::Column::Status.eq(BookingStatus::Paid));
        if let Some(from) = since {
            query = query.filter(bookings::Column::BookingDate.gte(from));
        }
        Ok(query.into_model::<PaidBooking>().all(self.pool.as_ref()).await?)
    }

    pub async fn customer_dashboard(&self, customer_id: Uuid) -> AppResult<CustomerDashboard> {
        let rows = bookings::Entity::find()
            .filter(bookings::Column::CustomerId.eq(customer_id))
            .order_by_desc(bookings::Column::BookingDate)
            .order_by_desc(bookings::Column::StartTime)
            .limit(RECENT_BOOKINGS)
            .all(self.pool.as_ref())
            .await?;
        Ok(CustomerDashboard {
            recent_bookings: with_field_names(&self.pool, rows).await?,
        })
    }

    pub async fn cashier_dashboard(&self, today: NaiveDate) -> AppResult<CashierDashboard> {
        let total_bookings = self.count(bookings::Entity::find()).await?;
        let pending_bookings = self
            .count(bookings::Entity::find().filter(bookings::Column::Status.eq(BookingStatus::Pending)))
            .await?;
        let today_bookings = self
            .count(bookings::Entity::find().filter(bookings::Column::BookingDate.eq(today)))
            .await?;
        let paid_amount = self
            .paid_bookings(None)
            .await?
            .iter()
            .map(|p| p.total_amount)
            .sum();

        let recent = bookings::Entity::find()
            .order_by_desc(bookings::Column::CreatedAt)
            .limit(RECENT_BOOKINGS)
            .all(self.pool.as_ref())
            .await?;

        Ok(CashierDashboard {
            total_bookings,
            pending_bookings,
            today_bookings,
            paid_amount,
            recent_bookings: with_field_names(&self.pool, recent).await?,
        })
    }

    pub async fn admin_dashboard(&self, today: NaiveDate) -> AppResult<AdminDashboard> {
        let total_users = self.count(profiles::Entity::find()).await?;
        let active_fields = self
            .count(fields::Entity::find().filter(fields::Column::IsActive.eq(true)))
            .await?;
        let paid = self.paid_bookings(None).await?;

        Ok(AdminDashboard {
            total_users,
            total_revenue: paid.iter().map(|p| p.total_amount).sum(),
            paid_bookings: paid.len() as u64,
            active_fields,
            daily_revenue: daily_revenue(&paid, today, DASHBOARD_DAYS),
        })
    }

    pub async fn financial_report(&self, period: ReportPeriod, today: NaiveDate) -> AppResult<FinancialReport> {
        let paid = self.paid_bookings(Some(report_start(period, today))).await?;
        Ok(build_report(period, today, &paid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn paid(date: NaiveDate, amount: i64) -> PaidBooking {
        PaidBooking {
            booking_date: date,
            total_amount: amount,
        }
    }

    #[test]
    fn test_daily_revenue_includes_zero_days() {
        let today = d(2025, 10, 15);
        let rows = [paid(d(2025, 10, 15), 100), paid(d(2025, 10, 13), 50), paid(d(2025, 10, 13), 25)];

        let series = daily_revenue(&rows, today, 7);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, d(2025, 10, 9));
        assert_eq!(series[6], DailyRevenue { date: today, revenue: 100 });
        assert_eq!(series[4].revenue, 75);
        assert_eq!(series[5].revenue, 0);
    }

    #[test]
    fn test_buckets_group_and_sort_ascending() {
        let rows = [
            paid(d(2025, 10, 2), 300),
            paid(d(2025, 9, 30), 100),
            paid(d(2025, 10, 2), 200),
        ];

        let daily = financial_buckets(&rows, ReportPeriod::Daily);
        let labels: Vec<_> = daily.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["2025-09-30", "2025-10-02"]);
        assert_eq!(daily[1].revenue, 500);
        assert_eq!(daily[1].bookings, 2);

        let monthly = financial_buckets(&rows, ReportPeriod::Monthly);
        let labels: Vec<_> = monthly.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["2025-09", "2025-10"]);
    }

    #[test]
    fn test_report_totals_and_average() {
        let today = d(2025, 10, 15);
        let rows = [paid(d(2025, 10, 1), 100), paid(d(2025, 10, 2), 201)];
        let report = build_report(ReportPeriod::Daily, today, &rows);
        assert_eq!(report.total_revenue, 301);
        assert_eq!(report.total_bookings, 2);
        assert_eq!(report.average_revenue, 150);
        assert_eq!(report.from, d(2025, 9, 15));

        let empty = build_report(ReportPeriod::Monthly, today, &[]);
        assert_eq!(empty.average_revenue, 0);
        assert_eq!(empty.from, d(2024, 10, 1));
    }

    #[tokio::test]
    async fn test_financial_report_reads_paid_rows() {
        let row = |date: NaiveDate, amount: i64| {
            BTreeMap::from([
                ("booking_date", Value::ChronoDate(Some(Box::new(date)))),
                ("total_amount", Value::BigInt(Some(amount))),
            ])
        };
        let db: DbPool = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[row(d(2025, 10, 3), 100_000), row(d(2025, 10, 1), 50_000)]])
            .into_connection()
            .into();
        let svc = ReportService::new(db);

        let report = svc
            .financial_report(ReportPeriod::Daily, d(2025, 10, 15))
            .await
            .unwrap();
        assert_eq!(report.buckets[0].label, "2025-10-01");
        assert_eq!(report.total_revenue, 150_000);
    }
}
