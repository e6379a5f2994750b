//! Paid revenue reports.
//!
//! Amounts come from `order_items.price_cents` of orders whose payment is
//! PAID and was created inside `[from, to]`, so per-course figures add up
//! to the summary even when an order holds several courses.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{CourseRevenue, InstructorCourseRevenue, RevenuePoint, RevenueSummary, TagRevenue};

pub struct RevenueRepository {
    pool: PgPool,
}

impl RevenueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn summary(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<RevenueSummary, DatabaseError> {
        let summary = sqlx::query_as::<_, RevenueSummary>(
            r#"
            SELECT
                COALESCE(SUM(oi.price_cents), 0)::BIGINT AS total_revenue,
                COUNT(DISTINCT p.id) AS total_paid_transactions,
                COUNT(DISTINCT p.id) FILTER (WHERE p.created_at::date = CURRENT_DATE) AS today_transactions,
                COUNT(DISTINCT oi.course_id) AS total_courses,
                (SELECT COUNT(DISTINCT e.student_id)
                   FROM enrollments e WHERE e.status = 'ACTIVE') AS total_students
            FROM payments p
            JOIN orders o ON o.id = p.order_id
            JOIN order_items oi ON oi.order_id = o.id
            WHERE p.status = 'PAID' AND p.created_at BETWEEN $1 AND $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    /// `unit` is a `date_trunc` field and `label` a matching `to_char` format
    pub async fn by_date(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        unit: &str,
        label: &str,
    ) -> Result<Vec<RevenuePoint>, DatabaseError> {
        let points = sqlx::query_as::<_, RevenuePoint>(
            r#"
            SELECT
                TO_CHAR(DATE_TRUNC($3, p.created_at AT TIME ZONE 'UTC'), $4) AS date,
                COALESCE(SUM(oi.price_cents), 0)::BIGINT AS revenue
            FROM payments p
            JOIN orders o ON o.id = p.order_id
            JOIN order_items oi ON oi.order_id = o.id
            WHERE p.status = 'PAID' AND p.created_at BETWEEN $1 AND $2
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(unit)
        .bind(label)
        .fetch_all(&self.pool)
        .await?;

        Ok(points)
    }

    pub async fn by_course(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<CourseRevenue>, DatabaseError> {
        let rows = sqlx::query_as::<_, CourseRevenue>(
            r#"
            SELECT
                c.id AS course_id,
                c.title AS course_title,
                u.full_name AS instructor_name,
                SUM(oi.price_cents)::BIGINT AS total_revenue,
                COUNT(DISTINCT o.user_id) AS total_students
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN payments p ON p.order_id = o.id
            JOIN courses c ON c.id = oi.course_id
            JOIN users u ON u.id = c.instructor_id
            WHERE p.status = 'PAID' AND p.created_at BETWEEN $1 AND $2
            GROUP BY c.id, c.title, u.full_name
            HAVING SUM(oi.price_cents) > 0
            ORDER BY total_revenue DESC, c.id
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn by_tag(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<TagRevenue>, DatabaseError> {
        let rows = sqlx::query_as::<_, TagRevenue>(
            r#"
            SELECT
                t.id AS tag_id,
                t.name AS tag_name,
                SUM(oi.price_cents)::BIGINT AS total_revenue,
                COUNT(DISTINCT oi.course_id) AS course_count
            FROM tags t
            JOIN course_tags ct ON ct.tag_id = t.id
            JOIN order_items oi ON oi.course_id = ct.course_id
            JOIN orders o ON o.id = oi.order_id
            JOIN payments p ON p.order_id = o.id
            WHERE p.status = 'PAID' AND p.created_at BETWEEN $1 AND $2
            GROUP BY t.id, t.name
            HAVING SUM(oi.price_cents) > 0
            ORDER BY total_revenue DESC, t.id
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn instructor_courses(
        &self,
        instructor_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<InstructorCourseRevenue>, DatabaseError> {
        let rows = sqlx::query_as::<_, InstructorCourseRevenue>(
            r#"
            SELECT
                c.id AS course_id,
                c.title,
                SUM(oi.price_cents)::BIGINT AS revenue,
                COUNT(DISTINCT o.user_id) AS students
            FROM courses c
            JOIN order_items oi ON oi.course_id = c.id
            JOIN orders o ON o.id = oi.order_id
            JOIN payments p ON p.order_id = o.id
            WHERE c.instructor_id = $3
              AND p.status = 'PAID' AND p.created_at BETWEEN $1 AND $2
            GROUP BY c.id, c.title
            ORDER BY revenue DESC, c.id
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(instructor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
