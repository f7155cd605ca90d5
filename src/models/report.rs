use crate::models::BookingResponse;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerDashboard {
    pub recent_bookings: Vec<BookingResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CashierDashboard {
    pub total_bookings: u64,
    pub pending_bookings: u64,
    pub today_bookings: u64,
    /// Sum of `total_amount` over paid bookings
    pub paid_amount: i64,
    pub recent_bookings: Vec<BookingResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailyRevenue {
    #[schema(value_type = String)]
    pub date: NaiveDate,
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminDashboard {
    pub total_users: u64,
    pub total_revenue: i64,
    pub paid_bookings: u64,
    pub active_fields: u64,
    /// Last seven days, oldest first
    pub daily_revenue: Vec<DailyRevenue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    #[default]
    Daily,
    Monthly,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FinancialQuery {
    pub period: Option<ReportPeriod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FinancialBucket {
    /// `YYYY-MM-DD` for daily buckets, `YYYY-MM` for monthly
    pub label: String,
    pub revenue: i64,
    pub bookings: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FinancialReport {
    pub period: ReportPeriod,
    #[schema(value_type = String)]
    pub from: NaiveDate,
    #[schema(value_type = String)]
    pub to: NaiveDate,
    pub buckets: Vec<FinancialBucket>,
    pub total_revenue: i64,
    pub total_bookings: u64,
    /// Revenue per non-empty bucket, rounded down
    pub average_revenue: i64,
}
