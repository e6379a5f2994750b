use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SystemOverview {
    pub total_users: i64,
    pub total_students: i64,
    pub total_instructors: i64,
    pub total_courses: i64,
    pub published_courses: i64,
    pub today_transactions: i64,
    pub month_revenue: i64,
}
