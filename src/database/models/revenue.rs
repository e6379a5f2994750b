use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Paid totals over a date range; amounts are in cents
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total_revenue: i64,
    pub total_paid_transactions: i64,
    pub today_transactions: i64,
    pub total_courses: i64,
    pub total_students: i64,
}

/// One chart bucket, labelled `YYYY-MM-DD` or `YYYY-MM`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RevenuePoint {
    pub date: String,
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseRevenue {
    pub course_id: i64,
    pub course_title: String,
    pub instructor_name: String,
    pub total_revenue: i64,
    pub total_students: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagRevenue {
    pub tag_id: i64,
    pub tag_name: String,
    pub total_revenue: i64,
    pub course_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InstructorCourseRevenue {
    pub course_id: i64,
    pub title: String,
    pub revenue: i64,
    pub students: i64,
}
