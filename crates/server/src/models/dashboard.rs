//! Admin dashboard figures.

use serde::Serialize;

use pawtopia_core::Price;

/// Store-wide counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_income: Price,
    pub total_quantity_sold: i64,
    pub user_count: i64,
    pub order_count: i64,
    pub pending_orders: i64,
    pub pending_appointments: i64,
}
